//! Pairs every node of the light document with its counterpart in the dark document.
//!
//! Both documents come from the same source subtree, so most nodes line up by flat
//! position. When the structure diverges (a theme hides a badge, swaps an icon), the
//! candidates are narrowed step by step: fingerprint, embedded-copy back-reference or box
//! overlap, node content, and finally fingerprint length for paths.

use std::collections::HashMap;

use crate::error::{CaptureError, Result};
use crate::types::{NodeId, SvgTag, VectorNode};

/// Tags taking part in theme reconciliation.
const MATCHED_TAGS: &[SvgTag] = &[
    SvgTag::Line,
    SvgTag::Path,
    SvgTag::Rect,
    SvgTag::Text,
    SvgTag::ForeignObject,
    SvgTag::G,
    SvgTag::Use,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    Positional,
    Href,
    BackReference,
    Fingerprint,
    Overlap,
    Content,
    PathLength,
    /// First remaining same-tag node after every narrowing step.
    DocumentOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Index into the flattened dark node list.
    pub index: usize,
    pub reason: MatchReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemePair {
    pub light: NodeId,
    pub dark: Option<NodeId>,
    pub reason: Option<MatchReason>,
}

#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    pub pairs: Vec<ThemePair>,
    /// Fingerprints (or tags) of light nodes without a counterpart.
    pub unmatched: Vec<String>,
}

impl MatchReport {
    pub fn matched(&self) -> usize {
        self.pairs.iter().filter(|p| p.dark.is_some()).count()
    }

    /// Light → dark node ids of every matched pair.
    pub fn dark_for(&self) -> HashMap<NodeId, NodeId> {
        self.pairs
            .iter()
            .filter_map(|p| p.dark.map(|d| (p.light, d)))
            .collect()
    }
}

/// Matchable nodes of the top-level document in pre-order; definitions and nested
/// `<svg>` documents are left out.
pub fn flatten(root: &VectorNode) -> Vec<&VectorNode> {
    fn visit<'a>(node: &'a VectorNode, out: &mut Vec<&'a VectorNode>) {
        if node.nested || node.tag == SvgTag::Defs {
            return;
        }
        if MATCHED_TAGS.contains(&node.tag) {
            out.push(node);
        }
        for child in &node.children {
            visit(child, out);
        }
    }
    let mut out = Vec::new();
    visit(root, &mut out);
    out
}

/// Keeps `narrowed` when it is non-empty, otherwise the previous pool.
fn narrow(pool: Vec<usize>, keep: impl Fn(usize) -> bool) -> (Vec<usize>, bool) {
    let narrowed: Vec<usize> = pool.iter().copied().filter(|&i| keep(i)).collect();
    if narrowed.is_empty() {
        (pool, false)
    } else {
        (narrowed, true)
    }
}

fn overlaps(a: &VectorNode, b: &VectorNode) -> bool {
    match (a.bbox, b.bbox) {
        (Some(x), Some(y)) if x.is_zero_sized() || y.is_zero_sized() => x == y,
        (Some(x), Some(y)) => x.overlaps(&y),
        _ => false,
    }
}

type ContentCheck = fn(&VectorNode, &VectorNode) -> bool;

fn same_d(a: &VectorNode, b: &VectorNode) -> bool {
    a.attr("d") == b.attr("d")
}

fn same_endpoints(a: &VectorNode, b: &VectorNode) -> bool {
    ["x1", "y1", "x2", "y2"].iter().all(|k| a.attr(k) == b.attr(k))
}

fn same_text(a: &VectorNode, b: &VectorNode) -> bool {
    a.full_text() == b.full_text()
}

fn same_x(a: &VectorNode, b: &VectorNode) -> bool {
    a.attr("x") == b.attr("x")
}

fn same_y(a: &VectorNode, b: &VectorNode) -> bool {
    a.attr("y") == b.attr("y")
}

const PATH_CHECKS: &[ContentCheck] = &[same_d];
const LINE_CHECKS: &[ContentCheck] = &[same_endpoints];
const TEXT_CHECKS: &[ContentCheck] = &[same_text, same_x, same_y];

fn content_checks(tag: &SvgTag) -> &'static [ContentCheck] {
    match tag {
        SvgTag::Path => PATH_CHECKS,
        SvgTag::Line => LINE_CHECKS,
        SvgTag::Text => TEXT_CHECKS,
        _ => &[],
    }
}

/// Ordered candidates in `dark` for the light node at flat position `index`. Claimed dark
/// nodes are never offered. A positional match is returned alone.
pub fn rank_candidates(
    light: &VectorNode,
    index: usize,
    dark: &[&VectorNode],
    claimed: &[bool],
) -> Vec<Candidate> {
    let free = |i: usize| !claimed.get(i).copied().unwrap_or(false);

    if light.tag == SvgTag::Use {
        let href = light.attr("href");
        let by_href: Vec<usize> = (0..dark.len())
            .filter(|&i| {
                free(i) && dark[i].tag == SvgTag::Use && href.is_some() && dark[i].attr("href") == href
            })
            .collect();
        if !by_href.is_empty() {
            return by_href
                .into_iter()
                .map(|i| Candidate { index: i, reason: MatchReason::Href })
                .collect();
        }
        // differing bitmaps have differing ids; fall back to the canvas back-reference
        return (0..dark.len())
            .filter(|&i| {
                free(i)
                    && dark[i].tag == SvgTag::Use
                    && light.copy_of.is_some()
                    && dark[i].copy_of == light.copy_of
            })
            .map(|i| Candidate {
                index: i,
                reason: MatchReason::BackReference,
            })
            .collect();
    }

    if let Some(other) = dark.get(index) {
        if free(index)
            && other.tag == light.tag
            && light.fingerprint.is_some()
            && other.fingerprint == light.fingerprint
            && other.copy_of == light.copy_of
        {
            return vec![Candidate {
                index,
                reason: MatchReason::Positional,
            }];
        }
    }

    // without a box, fingerprint or back-reference nothing can narrow the pool
    if light.fingerprint.is_none() && light.bbox.is_none() && light.copy_of.is_none() {
        return Vec::new();
    }

    let mut pool: Vec<usize> = (0..dark.len())
        .filter(|&i| free(i) && dark[i].tag == light.tag)
        .collect();
    let mut reason = MatchReason::DocumentOrder;

    let (next, fingerprinted) = narrow(pool, |i| {
        light.fingerprint.is_some() && dark[i].fingerprint == light.fingerprint
    });
    pool = next;
    if fingerprinted {
        reason = MatchReason::Fingerprint;
    }

    if light.copy_of.is_some() {
        pool.retain(|&i| dark[i].copy_of == light.copy_of);
        reason = MatchReason::BackReference;
    } else if light.bbox.is_some() {
        if fingerprinted {
            let (next, narrowed) = narrow(pool, |i| overlaps(light, dark[i]));
            pool = next;
            if narrowed && pool.len() == 1 {
                reason = MatchReason::Overlap;
            }
        } else {
            pool.retain(|&i| overlaps(light, dark[i]));
            reason = MatchReason::Overlap;
        }
    }

    if pool.len() > 1 {
        for check in content_checks(&light.tag) {
            let (next, narrowed) = narrow(pool, |i| check(light, dark[i]));
            pool = next;
            if narrowed {
                reason = MatchReason::Content;
            }
            if pool.len() <= 1 {
                break;
            }
        }
    }

    if pool.len() > 1 && light.tag == SvgTag::Path {
        let length = light.fingerprint.as_ref().map(String::len);
        let (next, narrowed) = narrow(pool, |i| {
            dark[i].fingerprint.as_ref().map(String::len) == length
        });
        pool = next;
        if narrowed {
            reason = MatchReason::PathLength;
        }
    }

    pool.into_iter()
        .map(|index| Candidate { index, reason })
        .collect()
}

/// Pairs every light node with at most one dark node.
pub fn match_documents(light_root: &VectorNode, dark_root: &VectorNode) -> Result<MatchReport> {
    let light = flatten(light_root);
    let dark = flatten(dark_root);
    let mut claimed = vec![false; dark.len()];
    let mut report = MatchReport::default();

    for (index, node) in light.iter().enumerate() {
        let candidates = rank_candidates(node, index, &dark, &claimed);
        if node.copy_of.is_some() && node.tag != SvgTag::Use && candidates.len() > 1 {
            return Err(CaptureError::invariant(format!(
                "{} dark candidates remain for embedded copy {}",
                candidates.len(),
                node.copy_of.as_deref().unwrap_or_default()
            )));
        }
        match candidates.first() {
            Some(candidate) => {
                claimed[candidate.index] = true;
                report.pairs.push(ThemePair {
                    light: node.id,
                    dark: Some(dark[candidate.index].id),
                    reason: Some(candidate.reason),
                });
            }
            None => {
                let label = node
                    .fingerprint
                    .clone()
                    .unwrap_or_else(|| node.tag.as_str().to_string());
                log::warn!("no dark counterpart for <{}> {label}", node.tag.as_str());
                report.unmatched.push(label);
                report.pairs.push(ThemePair {
                    light: node.id,
                    dark: None,
                    reason: None,
                });
            }
        }
    }
    log::debug!(
        "matched {} of {} light nodes ({} unmatched)",
        report.matched(),
        light.len(),
        report.unmatched.len()
    );
    Ok(report)
}
