//! Inline Node script that records a subtree snapshot under one color scheme.
//!
//! Arguments: url, width, height, navigation timeout (ms), settle delay (ms), color scheme,
//! root selector, headless flag. Prints `{"status":"ok","snapshot":{...}}` on success and a
//! `{"status":"error","message":...}` object on stderr otherwise.

pub(crate) const SNAPSHOT_SCRIPT: &str = r#"
const [, url, width, height, navTimeout, settleMs, colorScheme, selector, headlessFlag] = process.argv;

function freezeMotion() {
  const style = document.createElement('style');
  style.textContent = '*, *::before, *::after { transition: none !important; }';
  document.head.appendChild(style);
  for (const animation of document.getAnimations()) {
    try {
      animation.pause();
      animation.currentTime = 0;
    } catch (_) {
      animation.cancel();
    }
  }
}

function serialize(rootSelector) {
  // runs inside the page: every helper lives in this function
  const STYLE_PROPERTIES = [
    'display', 'visibility', 'opacity', 'position', 'z-index', 'overflow', 'overflow-x', 'overflow-y',
    'background-color', 'color', 'box-shadow', 'filter', 'backdrop-filter', 'appearance',
    'border-top-width', 'border-right-width', 'border-bottom-width', 'border-left-width',
    'border-top-style', 'border-right-style', 'border-bottom-style', 'border-left-style',
    'border-top-color', 'border-right-color', 'border-bottom-color', 'border-left-color',
    'border-top-left-radius', 'border-top-right-radius', 'border-bottom-right-radius', 'border-bottom-left-radius',
    'outline-width', 'outline-style', 'outline-color', 'outline-offset',
    'padding-top', 'padding-right', 'padding-bottom', 'padding-left',
    'font-family', 'font-size', 'font-weight', 'font-style', 'line-height', 'letter-spacing',
    'text-align', 'text-decoration', 'text-overflow', 'text-transform', 'white-space',
    'object-fit', 'mask-image', '-webkit-mask-image', 'mask-composite',
    'animation', 'animation-name', 'transform', 'transform-origin', 'cursor'
  ];

  function readStyle(style) {
    const out = {};
    for (const prop of STYLE_PROPERTIES) {
      const value = style.getPropertyValue(prop);
      if (value !== '') out[prop] = value;
    }
    return out;
  }

  const num = (v) => (typeof v === 'number' && Number.isFinite(v) ? v : undefined);

  // Canvas renderers leave their last draw call on `canvas._drawn`; keep the shapes the
  // replay understands, in its own field names.
  function drawnShape(s) {
    if (!s || typeof s !== 'object') return null;
    const [x, y] = Array.isArray(s.coords) ? s.coords : [s.x, s.y];
    const paint = { fill: s.fillStyle ?? s.fill, stroke: s.strokeStyle ?? s.stroke, lineWidth: num(s.lineWidth) };
    switch (s.type) {
      case 'rectangle':
      case 'rect':
        if (num(x) === undefined || num(y) === undefined) return null;
        return { type: 'rect', x, y, width: num(s.w ?? s.width) ?? 0, height: num(s.h ?? s.height) ?? 0,
          radius: num(s.borderRadius ?? s.radius), ...paint };
      case 'circle':
        if (num(x) === undefined || num(y) === undefined || num(s.r) === undefined) return null;
        return { type: 'circle', x, y, r: s.r, ...paint };
      case 'multiline':
      case 'line':
        return Array.isArray(s.coords ?? s.points)
          ? { type: 'line', points: s.coords ?? s.points, stroke: paint.stroke, lineWidth: paint.lineWidth,
              dash: Array.isArray(s.lineDash ?? s.dash) ? (s.lineDash ?? s.dash) : undefined }
          : null;
      case 'polygon':
        return Array.isArray(s.coords ?? s.points) ? { type: 'polygon', points: s.coords ?? s.points, ...paint } : null;
      case 'text':
        if (num(x) === undefined || num(y) === undefined || typeof s.text !== 'string') return null;
        return { type: 'text', x, y, text: s.text, fill: paint.fill, font: s.font, textAlign: s.textAlign };
      default:
        return null;
    }
  }

  function drawnShapes(canvas) {
    const drawn = canvas._drawn;
    if (!drawn || !Array.isArray(drawn.shapes)) return undefined;
    const shapes = drawn.shapes.map(drawnShape).filter(Boolean);
    if (shapes.length === 0) return undefined;
    const t = drawn.translate;
    const translate = Array.isArray(t) ? t : [num(t && t.x) ?? 0, num(t && t.y) ?? 0];
    return { shapes, scale: num(drawn.scale) ?? 1, translate };
  }

  function canvasDataUrl(canvas) {
    // custom WebGL renderers clear their buffer after presenting; redraw first
    const deck = canvas._deckgl;
    if (deck && typeof deck.redraw === 'function') {
      deck.redraw('screenshot');
      const own = typeof deck.getCanvas === 'function' ? deck.getCanvas() : null;
      if (own) return own.toDataURL('image/png');
    }
    return canvas.toDataURL('image/png');
  }

  const measureContext = document.createElement('canvas').getContext('2d');
  const textWidth = (text, style) => {
    measureContext.font = style.font || `${style.fontWeight} ${style.fontSize} ${style.fontFamily}`;
    return measureContext.measureText(text).width;
  };

  const isPrivateUse = (text) => Array.from(text).some((ch) => {
    const cp = ch.codePointAt(0);
    return (cp >= 0xe000 && cp <= 0xf8ff) || cp >= 0xf0000;
  });

  const root = document.querySelector(rootSelector);
  if (!root) throw new Error(`No element matches ${rootSelector}`);
  let nextId = 0;

  const rect = (r) => ({ x: r.x, y: r.y, width: r.width, height: r.height });

  const rootPath = [];
  for (let el = root; el && el !== document.body && el.parentElement; el = el.parentElement) {
    rootPath.unshift(Array.prototype.indexOf.call(el.parentElement.children, el));
  }

  const keyframesFor = (names) => {
    const wanted = new Set(names.split(',').map((n) => n.trim()).filter((n) => n && n !== 'none'));
    const rules = [];
    if (wanted.size === 0) return rules;
    for (const sheet of document.styleSheets) {
      let cssRules;
      try { cssRules = sheet.cssRules; } catch (_) { continue; }
      for (const rule of cssRules) {
        if (rule.type === CSSRule.KEYFRAMES_RULE && wanted.has(rule.name)) rules.push(rule.cssText);
      }
    }
    return rules;
  };

  const textNode = (node) => {
    const range = document.createRange();
    range.selectNodeContents(node);
    const rects = range.getClientRects();
    const out = { nodeType: 'text', text: node.textContent, lineCount: rects.length };
    if (rects.length > 0) out.rect = rect(range.getBoundingClientRect());
    const length = node.textContent.length;
    if (length > 0) {
      range.setStart(node, 0);
      range.setEnd(node, 1);
      out.firstChar = rect(range.getBoundingClientRect());
      range.setStart(node, length - 1);
      range.setEnd(node, length);
      out.lastChar = rect(range.getBoundingClientRect());
    }
    return out;
  };

  const element = (el) => {
    const style = getComputedStyle(el);
    const tag = el.tagName.toLowerCase();
    const attributes = {};
    for (const attr of el.attributes) attributes[attr.name] = attr.value;
    const out = {
      nodeType: 'element',
      id: nextId++,
      tag,
      classes: Array.from(el.classList),
      attributes,
      style: readStyle(style),
      bbox: rect(el.getBoundingClientRect()),
      clientHeight: el.clientHeight,
      clientWidth: el.clientWidth,
      checkVisibility: typeof el.checkVisibility === 'function'
        ? el.checkVisibility({ opacityProperty: true, visibilityProperty: true })
        : true,
      children: [],
      markers: {}
    };

    if (tag === 'input' || tag === 'textarea' || tag === 'select') {
      out.value = el.value;
      const placeholderStyle = getComputedStyle(el, '::placeholder');
      out.placeholderStyle = readStyle(placeholderStyle);
      const shown = el.value || el.getAttribute('placeholder') || '';
      if (tag === 'input' && shown && !/^(date|datetime-local|time|month|week)$/.test(el.type)) {
        out.markers.textWidth = textWidth(shown, el.value ? style : placeholderStyle);
      }
    }
    if (tag === 'svg') {
      out.markers.svgMarkup = new XMLSerializer().serializeToString(el);
    }
    if (tag === 'img') {
      out.markers.image = {
        src: el.currentSrc || el.src,
        naturalWidth: el.naturalWidth,
        naturalHeight: el.naturalHeight
      };
    }
    if (tag === 'canvas') {
      const drawn = drawnShapes(el);
      if (drawn) out.markers.drawn = drawn;
      try {
        out.markers.pixels = { width: el.width, height: el.height, dataUrl: canvasDataUrl(el) };
      } catch (_) {
        // tainted canvas
      }
    }
    const before = getComputedStyle(el, '::before');
    const content = before.getPropertyValue('content');
    if (content && content !== 'none' && content !== 'normal') {
      const glyph = content.replace(/^["']|["']$/g, '');
      const fontFamily = before.getPropertyValue('font-family');
      if (/icon/i.test(fontFamily) || isPrivateUse(glyph)) {
        out.markers.iconGlyph = { glyph, fontFamily };
      }
    }
    const keyframes = keyframesFor(style.getPropertyValue('animation-name'));
    if (keyframes.length > 0) out.markers.keyframes = keyframes;

    if (tag !== 'svg') {
      for (const child of el.childNodes) {
        if (child.nodeType === Node.ELEMENT_NODE) {
          out.children.push(element(child));
        } else if (child.nodeType === Node.TEXT_NODE && child.textContent.length > 0) {
          out.children.push(textNode(child));
        }
      }
    }
    return out;
  };

  const serialized = element(root);
  delete serialized.nodeType;
  return {
    url: location.href,
    title: document.title,
    viewport: { width: window.innerWidth, height: window.innerHeight },
    connected: root.isConnected,
    rootPath,
    root: serialized
  };
}

async function run() {
  let browser;
  try {
    const { chromium } = require('playwright');
    browser = await chromium.launch({ headless: headlessFlag !== '0' });
    const context = await browser.newContext({
      viewport: { width: parseInt(width, 10), height: parseInt(height, 10) },
      colorScheme: colorScheme
    });
    const page = await context.newPage();
    await page.goto(url, { waitUntil: 'networkidle', timeout: parseInt(navTimeout, 10) });
    await page.waitForSelector(selector, { timeout: parseInt(navTimeout, 10) });
    await page.waitForTimeout(parseInt(settleMs, 10));
    await page.evaluate(freezeMotion);
    const snapshot = await page.evaluate(serialize, selector);
    process.stdout.write(JSON.stringify({ status: 'ok', snapshot }));
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    process.stderr.write(JSON.stringify({ status: 'error', message }));
    process.exitCode = 1;
  } finally {
    if (browser) {
      await browser.close();
    }
  }
}

run();
"#;
