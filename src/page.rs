//! Dashboard page assembly.
//!
//! All six views are built server-side, serialized into one JSON blob, and
//! embedded into a self-contained HTML template. The template's JS renders
//! the active view, drives the sidebar navigation, and recomputes the
//! business-impact projection when the sliders move, using the model
//! constants shipped in the blob so no formula constant lives in two
//! places.

use serde::Serialize;

use crate::error::ImpactError;
use crate::impact::{
    slider_specs, Assumptions, SliderSpec, AVG_PLAYS_PER_REEL, ENGINEERING_COST,
    OBSERVED_ADOPTION, REELS_REFERENCE, REVENUE_REFERENCE,
};
use crate::model::BusinessImpactRecord;
use crate::render::views::{build_all_views, ViewContent};
use crate::session::RenderContext;
use crate::source::LoadedResults;

/// Constants the page JS needs to mirror the projection exactly.
#[derive(Debug, Clone, Serialize)]
pub struct ModelConstants {
    pub observed_adoption: f64,
    pub avg_plays_per_reel: f64,
    pub engineering_cost: f64,
    pub revenue_reference: f64,
    pub reels_reference: f64,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            observed_adoption: OBSERVED_ADOPTION,
            avg_plays_per_reel: AVG_PLAYS_PER_REEL,
            engineering_cost: ENGINEERING_COST,
            revenue_reference: REVENUE_REFERENCE,
            reels_reference: REELS_REFERENCE,
        }
    }
}

/// Everything the template consumes.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub generated: String,
    pub initial_view: String,
    pub assumptions: Assumptions,
    pub sliders: [SliderSpec; 3],
    pub model: ModelConstants,
    /// Per-period baselines for the client-side recompute.
    pub record: BusinessImpactRecord,
    pub views: Vec<ViewContent>,
}

pub const DATA_PLACEHOLDER: &str = "__DASHBOARD_DATA__";

/// Assemble the data blob for one render context.
pub fn dashboard_data(
    results: &LoadedResults,
    ctx: &RenderContext,
) -> Result<DashboardData, ImpactError> {
    ctx.assumptions.validate()?;
    Ok(DashboardData {
        generated: chrono::Utc::now().to_rfc3339(),
        initial_view: ctx.view.slug().into(),
        assumptions: ctx.assumptions,
        sliders: slider_specs(),
        model: ModelConstants::default(),
        record: results.bundle.business_impact,
        views: build_all_views(results, ctx)?,
    })
}

/// Render the full self-contained page.
pub fn render_page(results: &LoadedResults, ctx: &RenderContext) -> Result<String, ImpactError> {
    let data = dashboard_data(results, ctx)?;
    // "</" only occurs inside JSON string values; escape it so the blob
    // cannot terminate its own script tag.
    let blob = serde_json::to_string(&data)
        .expect("dashboard data serializes")
        .replace("</", "<\\/");
    Ok(TEMPLATE.replace(DATA_PLACEHOLDER, &blob))
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Quick Edit Experiment Dashboard</title>
  <style>
    :root {
      --bg: #f5f7fa; --bg-raised: #ffffff; --bg-inset: #eef1f5;
      --fg: #2b2f36; --fg-muted: #667085; --fg-subtle: #98a2b3; --fg-bright: #101828;
      --accent: #1E88E5; --accent-muted: #e3f2fd;
      --green: #4CAF50; --green-muted: #e8f5e9;
      --red: #f44336; --red-muted: #ffebee;
      --orange: #FF9800; --purple: #9C27B0;
      --border: #e4e7ec; --border-heavy: #cdd5e0;
      --mono: 'SF Mono', 'Cascadia Code', Menlo, monospace;
      --sans: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
      --radius: 8px; --radius-sm: 4px;
      --shadow: 0 1px 3px rgba(16,24,40,0.08), 0 1px 2px rgba(16,24,40,0.04);
      --sidebar-w: 270px;
    }
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: var(--sans); background: var(--bg); color: var(--fg); line-height: 1.55; }

    /* -- Sidebar -- */
    aside {
      position: fixed; top: 0; left: 0; bottom: 0; width: var(--sidebar-w);
      background: var(--bg-raised); border-right: 1px solid var(--border);
      padding: 1.25rem 1rem; overflow-y: auto;
    }
    .brand { font-size: 1.05rem; font-weight: 700; color: var(--fg-bright); margin-bottom: 0.2rem; }
    .brand-sub { font-size: 0.72rem; color: var(--fg-muted); font-family: var(--mono); margin-bottom: 1rem; }
    .side-section { border-top: 1px solid var(--border); padding-top: 0.8rem; margin-top: 0.8rem; }
    .side-title { font-size: 0.68rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--fg-muted); font-weight: 600; margin-bottom: 0.5rem; }
    .nav-item {
      display: block; width: 100%; text-align: left; border: none; background: none;
      padding: 0.42rem 0.6rem; border-radius: var(--radius-sm); cursor: pointer;
      color: var(--fg); font-size: 0.82rem; font-family: var(--sans);
    }
    .nav-item:hover { background: var(--bg-inset); }
    .nav-item.active { background: var(--accent-muted); color: var(--accent); font-weight: 600; }

    /* -- Sliders -- */
    .slider-block { margin-bottom: 0.9rem; }
    .slider-label { display: flex; justify-content: space-between; font-size: 0.74rem; margin-bottom: 0.15rem; }
    .slider-label .val { font-family: var(--mono); color: var(--accent); }
    .slider-help { font-size: 0.66rem; color: var(--fg-subtle); margin-top: 0.1rem; }
    input[type=range] { width: 100%; accent-color: var(--accent); }
    .slider-error {
      display: none; margin-top: 0.5rem; padding: 0.45rem 0.6rem; border-radius: var(--radius-sm);
      background: var(--red-muted); color: var(--red); font-size: 0.7rem;
    }
    .slider-error.show { display: block; }

    /* -- Main -- */
    main { margin-left: var(--sidebar-w); padding: 1.5rem 2rem; max-width: 1100px; }
    h1 { color: var(--fg-bright); font-size: 1.45rem; letter-spacing: -0.01em; margin-bottom: 0.75rem; }
    .intro { color: var(--fg-muted); font-size: 0.88rem; margin-bottom: 0.6rem; max-width: 70ch; }

    /* -- Cards -- */
    .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 0.7rem; margin: 1rem 0; }
    .card {
      background: var(--bg-raised); border: 1px solid var(--border); border-radius: var(--radius);
      border-top: 3px solid var(--border); padding: 0.8rem 0.95rem; box-shadow: var(--shadow);
    }
    .card-label { font-size: 0.7rem; color: var(--fg-muted); text-transform: uppercase; letter-spacing: 0.04em; }
    .card-val { font-size: 1.45rem; font-weight: 700; color: var(--fg-bright); font-family: var(--mono); line-height: 1.3; }
    .card-detail { font-size: 0.7rem; color: var(--fg-subtle); }
    .card-delta { font-family: var(--mono); font-size: 0.72rem; font-weight: 600; }
    .card-delta.up { color: var(--green); }
    .card-delta.down { color: var(--red); }

    /* -- Tables -- */
    .table-title { font-size: 0.85rem; font-weight: 600; color: var(--fg-bright); margin: 1.1rem 0 0.4rem; }
    .table-wrap { overflow-x: auto; border: 1px solid var(--border); border-radius: var(--radius); background: var(--bg-raised); }
    table { width: 100%; border-collapse: collapse; font-size: 0.78rem; }
    th {
      padding: 0.5rem 0.7rem; text-align: left; font-size: 0.67rem; font-weight: 600;
      text-transform: uppercase; letter-spacing: 0.04em; color: var(--fg-muted);
      background: var(--bg-inset); border-bottom: 1px solid var(--border);
    }
    td { padding: 0.45rem 0.7rem; border-bottom: 1px solid var(--border); }
    tbody tr:last-child td { border-bottom: none; }
    .mono { font-family: var(--mono); }

    /* -- Charts -- */
    .chart { background: var(--bg-raised); border: 1px solid var(--border); border-radius: var(--radius); padding: 0.9rem; margin: 1rem 0; box-shadow: var(--shadow); }
    .chart-title { font-size: 0.8rem; font-weight: 600; color: var(--fg-bright); margin-bottom: 0.5rem; }
    .chart-legend { display: flex; gap: 1rem; font-size: 0.68rem; color: var(--fg-muted); margin-top: 0.4rem; flex-wrap: wrap; }
    .legend-dot { width: 9px; height: 9px; border-radius: 50%; display: inline-block; margin-right: 0.25rem; vertical-align: middle; }
    .panel-pair { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
    .bar-row { display: flex; align-items: center; gap: 0.55rem; padding: 0.18rem 0; }
    .bar-label { min-width: 140px; font-size: 0.7rem; text-align: right; color: var(--fg-muted); font-family: var(--mono); }
    .bar-track { flex: 1; height: 18px; background: var(--bg-inset); border-radius: var(--radius-sm); overflow: hidden; display: flex; }
    .bar-seg { height: 100%; }
    .bar-val { font-family: var(--mono); font-size: 0.68rem; min-width: 62px; color: var(--fg-muted); }

    /* -- Notes -- */
    .note {
      border-left: 4px solid var(--accent); background: var(--accent-muted);
      border-radius: var(--radius-sm); padding: 0.6rem 0.8rem; font-size: 0.8rem; margin: 0.8rem 0;
    }

    footer { margin: 2rem 0 0.5rem; font-size: 0.68rem; color: var(--fg-subtle); font-family: var(--mono); }

    @media (max-width: 820px) {
      aside { position: static; width: auto; border-right: none; border-bottom: 1px solid var(--border); }
      main { margin-left: 0; padding: 1rem; }
      .panel-pair { grid-template-columns: 1fr; }
    }
  </style>
</head>
<body>
  <aside>
    <div class="brand">Quick Edit Experiment</div>
    <div class="brand-sub" id="generated"></div>
    <div class="side-title">Dashboard Sections</div>
    <nav id="nav"></nav>
    <div class="side-section">
      <div class="side-title">Assumptions</div>
      <div id="sliders"></div>
      <div class="slider-error" id="slider-error"></div>
    </div>
  </aside>
  <main>
    <div id="view"></div>
    <footer id="footer"></footer>
  </main>

  <script id="dashboard-data" type="application/json">__DASHBOARD_DATA__</script>
  <script>
  const D = JSON.parse(document.getElementById('dashboard-data').textContent);
  const state = {
    view: D.initial_view,
    assumptions: Object.assign({}, D.assumptions),
  };

  // -- Formatting (mirrors the generator's format module) --
  function fmtPercent(f) { return (f * 100).toFixed(1) + '%'; }
  function fmtCurrency(v) { return '$' + Math.round(v).toLocaleString('en-US'); }
  function fmtCount(v) { return Math.round(v).toLocaleString('en-US'); }
  function fmtShort(v) {
    const a = Math.abs(v);
    if (a >= 1e9) return (v / 1e9).toFixed(1) + 'B';
    if (a >= 1e6) return (v / 1e6).toFixed(1) + 'M';
    if (a >= 1e3) return (v / 1e3).toFixed(1) + 'K';
    return fmtCount(v);
  }
  function esc(s) {
    return String(s).replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;');
  }

  // -- Projection (mirrors the generator's impact module) --
  function validate(a) {
    if (!isFinite(a.adoption_rate) || a.adoption_rate < 0 || a.adoption_rate > 1)
      return 'adoption_rate must be within [0, 1]';
    if (!isFinite(a.monetization_rate) || a.monetization_rate < 0 || a.monetization_rate > 1)
      return 'monetization_rate must be within [0, 1]';
    if (!isFinite(a.cpm) || a.cpm < 0)
      return 'cpm must be a non-negative dollar amount';
    return null;
  }
  function projectEstimate(period, a) {
    const base = D.record[period];
    const scale = a.adoption_rate / D.model.observed_adoption;
    const reels = base.additional_reels * scale;
    return {
      reels: reels,
      revenue: reels * D.model.avg_plays_per_reel * a.monetization_rate * (a.cpm / 1000),
      watch: base.additional_watch_time_hours * scale,
      creators: base.additional_creators * scale,
    };
  }
  function roiRows(revenue) {
    let payback = 'n/a', annualized = 'n/a';
    if (revenue > 0) {
      const months = D.model.engineering_cost / revenue;
      payback = months < 1 ? 'under 1 month' : months.toFixed(1) + ' months';
      annualized = fmtCount(Math.round((revenue * 12 - D.model.engineering_cost) / D.model.engineering_cost * 100)) + '%';
    }
    return [
      ['Monthly revenue impact', fmtCurrency(revenue)],
      ['Engineering cost', fmtCurrency(D.model.engineering_cost)],
      ['Payback period', payback],
      ['Annualized ROI', annualized],
    ];
  }

  // -- Slider-bound value substitution --
  function boundCardValue(bind, est, a) {
    switch (bind) {
      case 'revenue_monthly': return { value: fmtCurrency(est.revenue) };
      case 'reels_monthly': return { value: fmtShort(est.reels) };
      case 'adoption': return { value: fmtPercent(a.adoption_rate) };
      case 'revenue_monthly_delta':
        return { value: fmtCurrency(est.revenue), delta: (est.revenue - D.model.revenue_reference) / D.model.revenue_reference * 100 };
      case 'reels_monthly_delta':
        return { value: fmtShort(est.reels), delta: (est.reels - D.model.reels_reference) / D.model.reels_reference * 100 };
      case 'watch_monthly': return { value: fmtShort(est.watch) + ' hrs' };
      case 'creators_monthly': return { value: fmtShort(est.creators) };
      default: return null;
    }
  }
  function boundTableRows(table, est, a) {
    if (table.bind === 'roi') return roiRows(est.revenue);
    if (table.bind === 'assumptions') {
      const rows = table.rows.map(r => r.slice());
      rows[0][1] = fmtPercent(a.adoption_rate);
      rows[1][1] = fmtPercent(a.monetization_rate);
      rows[2][1] = fmtCurrency(a.cpm);
      return rows;
    }
    return table.rows;
  }

  // -- Renderers --
  function renderCards(cards, est, a) {
    if (!cards.length) return '';
    let html = '<div class="grid">';
    for (const c of cards) {
      let value = c.value, delta = c.delta_pct;
      const live = c.bind ? boundCardValue(c.bind, est, a) : null;
      if (live) { value = live.value; if (live.delta !== undefined) delta = live.delta; }
      html += '<div class="card" style="border-top-color:' + c.color + ';">';
      html += '<div class="card-label">' + esc(c.label) + '</div>';
      html += '<div class="card-val">' + esc(value) + '</div>';
      if (delta !== null && delta !== undefined) {
        const up = delta >= 0;
        html += '<div class="card-delta ' + (up ? 'up' : 'down') + '">' + (up ? '&#9650; ' : '&#9660; ') + Math.abs(delta).toFixed(1) + '%</div>';
      }
      if (c.detail) html += '<div class="card-detail">' + esc(c.detail) + '</div>';
      html += '</div>';
    }
    return html + '</div>';
  }

  function renderTable(t, est, a) {
    const rows = boundTableRows(t, est, a);
    let html = '<div class="table-title">' + esc(t.title) + '</div><div class="table-wrap"><table><thead><tr>';
    for (const h of t.headers) html += '<th>' + esc(h) + '</th>';
    html += '</tr></thead><tbody>';
    for (const r of rows) {
      html += '<tr>';
      r.forEach((cell, i) => {
        html += '<td' + (i > 0 ? ' class="mono"' : '') + '>' + esc(cell) + '</td>';
      });
      html += '</tr>';
    }
    return html + '</tbody></table></div>';
  }

  function renderForest(f) {
    const w = 640, rowH = 44, padL = 120, padR = 30, padT = 16, padB = 30;
    const h = padT + padB + f.points.length * rowH;
    let lo = 0, hi = f.target_pct;
    for (const p of f.points) { lo = Math.min(lo, p.ci_low_pct); hi = Math.max(hi, p.ci_high_pct); }
    lo -= 1; hi += 1;
    const x = v => padL + (v - lo) / (hi - lo) * (w - padL - padR);

    let svg = '<svg viewBox="0 0 ' + w + ' ' + h + '" style="width:100%;">';
    svg += '<line x1="' + x(0) + '" y1="' + padT + '" x2="' + x(0) + '" y2="' + (h - padB) + '" stroke="var(--fg-subtle)" stroke-dasharray="4,3"/>';
    svg += '<line x1="' + x(f.target_pct) + '" y1="' + padT + '" x2="' + x(f.target_pct) + '" y2="' + (h - padB) + '" stroke="var(--green)" stroke-dasharray="2,3"/>';
    svg += '<text x="' + x(f.target_pct) + '" y="' + (padT - 4) + '" font-size="9" fill="var(--green)" text-anchor="middle">' + f.target_pct + '% target</text>';
    f.points.forEach((p, i) => {
      const cy = padT + i * rowH + rowH / 2;
      svg += '<text x="' + (padL - 8) + '" y="' + (cy + 3) + '" font-size="11" fill="var(--fg)" text-anchor="end">' + esc(p.segment) + '</text>';
      svg += '<line x1="' + x(p.ci_low_pct) + '" y1="' + cy + '" x2="' + x(p.ci_high_pct) + '" y2="' + cy + '" stroke="var(--fg-subtle)" stroke-width="1.5"/>';
      for (const end of [p.ci_low_pct, p.ci_high_pct])
        svg += '<line x1="' + x(end) + '" y1="' + (cy - 4) + '" x2="' + x(end) + '" y2="' + (cy + 4) + '" stroke="var(--fg-subtle)" stroke-width="1.5"/>';
      svg += '<circle cx="' + x(p.lift_pct) + '" cy="' + cy + '" r="7" fill="' + p.color + '" stroke="#37474F" stroke-width="1.5">';
      svg += '<title>' + esc(p.segment) + ': +' + p.lift_pct.toFixed(1) + '% (p=' + p.p_value.toFixed(4) + ')</title></circle>';
    });
    for (let v = Math.ceil(lo / 5) * 5; v <= hi; v += 5)
      svg += '<text x="' + x(v) + '" y="' + (h - padB + 14) + '" font-size="9" fill="var(--fg-subtle)" text-anchor="middle">' + v + '%</text>';
    svg += '<text x="' + (padL + (w - padL - padR) / 2) + '" y="' + (h - 4) + '" font-size="10" fill="var(--fg-muted)" text-anchor="middle">' + esc(f.x_label) + '</text>';
    svg += '</svg>';
    return '<div class="chart"><div class="chart-title">Lift by Segment</div>' + svg +
      '<div class="chart-legend"><span><span class="legend-dot" style="background:var(--green);"></span>significant</span>' +
      '<span><span class="legend-dot" style="background:var(--red);"></span>not significant</span></div></div>';
  }

  function renderFunnel(fc) {
    const maxSessions = fc.bars.length ? fc.bars[0].sessions : 1;
    let left = '';
    for (const b of fc.bars) {
      const pct = b.sessions / maxSessions * 100;
      left += '<div class="bar-row"><span class="bar-label">' + esc(b.step) + '</span>' +
        '<div class="bar-track"><div class="bar-seg" style="width:' + pct.toFixed(1) + '%;background:' + b.color + ';"></div></div>' +
        '<span class="bar-val">' + fmtCount(b.sessions) + '</span></div>';
    }
    let maxDrop = 1;
    for (const b of fc.bars) maxDrop = Math.max(maxDrop, b.dropoff_pct);
    let right = '';
    for (const b of fc.bars) {
      right += '<div class="bar-row"><span class="bar-label">' + esc(b.step) + '</span>' +
        '<div class="bar-track"><div class="bar-seg" style="width:' + (b.dropoff_pct / maxDrop * 100).toFixed(1) + '%;background:var(--red);"></div></div>' +
        '<span class="bar-val">' + b.dropoff_pct.toFixed(1) + '%</span></div>';
    }
    return '<div class="chart"><div class="panel-pair">' +
      '<div><div class="chart-title">Funnel Conversion</div>' + left + '</div>' +
      '<div><div class="chart-title">Drop-off by Step</div>' + right + '</div>' +
      '</div></div>';
  }

  function renderTimeline(tl) {
    const toDay = s => Date.parse(s + 'T00:00:00Z') / 86400000;
    let min = Infinity, max = -Infinity;
    for (const b of tl.bars) { min = Math.min(min, toDay(b.start)); max = Math.max(max, toDay(b.end) + 1); }
    const span = Math.max(max - min, 1);
    let html = '<div class="chart"><div class="chart-title">Phased Rollout</div>';
    for (const b of tl.bars) {
      const off = (toDay(b.start) - min) / span * 100;
      const wd = (toDay(b.end) + 1 - toDay(b.start)) / span * 100;
      html += '<div class="bar-row"><span class="bar-label">' + esc(b.name) + '</span>' +
        '<div class="bar-track" title="' + esc(b.description) + ' (' + esc(b.audience) + ')">' +
        '<div style="width:' + off.toFixed(1) + '%;"></div>' +
        '<div class="bar-seg" style="width:' + wd.toFixed(1) + '%;background:' + b.color + ';"></div></div>' +
        '<span class="bar-val">&#8805;' + b.target_lift_pct.toFixed(0) + '% lift</span></div>';
      html += '<div style="margin-left:150px;font-size:0.66rem;color:var(--fg-subtle);">' + esc(b.start) + ' &rarr; ' + esc(b.end) + ' &middot; ' + esc(b.description) + '</div>';
    }
    return html + '</div>';
  }

  function renderView() {
    const v = D.views.find(x => x.slug === state.view) || D.views[0];
    const a = state.assumptions;
    const est = projectEstimate('monthly', a);
    let html = '<h1>' + esc(v.title) + '</h1>';
    for (const p of v.intro) html += '<p class="intro">' + esc(p) + '</p>';
    html += renderCards(v.cards, est, a);
    if (v.forest) html += renderForest(v.forest);
    if (v.funnel) html += renderFunnel(v.funnel);
    if (v.timeline) html += renderTimeline(v.timeline);
    for (const n of v.notes) html += '<div class="note">' + esc(n) + '</div>';
    for (const t of v.tables) html += renderTable(t, est, a);
    document.getElementById('view').innerHTML = html;
  }

  // -- Sidebar --
  function renderNav() {
    const nav = document.getElementById('nav');
    nav.innerHTML = D.views.map(v =>
      '<button class="nav-item' + (v.slug === state.view ? ' active' : '') + '" data-slug="' + v.slug + '">' + esc(v.title) + '</button>'
    ).join('');
    for (const btn of nav.querySelectorAll('.nav-item')) {
      btn.addEventListener('click', () => {
        state.view = btn.dataset.slug;
        renderNav();
        renderView();
      });
    }
  }

  function renderSliders() {
    const el = document.getElementById('sliders');
    el.innerHTML = D.sliders.map(s => {
      const val = state.assumptions[s.id];
      const shown = s.id === 'cpm' ? fmtCurrency(val) : fmtPercent(val);
      return '<div class="slider-block">' +
        '<div class="slider-label"><span>' + esc(s.label) + '</span><span class="val" id="val-' + s.id + '">' + shown + '</span></div>' +
        '<input type="range" id="in-' + s.id + '" min="' + s.min + '" max="' + s.max + '" step="' + s.step + '" value="' + val + '">' +
        '<div class="slider-help">' + esc(s.help) + '</div>' +
        '</div>';
    }).join('');
    for (const s of D.sliders) {
      document.getElementById('in-' + s.id).addEventListener('input', e => {
        const next = Object.assign({}, state.assumptions);
        next[s.id] = parseFloat(e.target.value);
        const err = validate(next);
        const errEl = document.getElementById('slider-error');
        if (err) {
          errEl.textContent = err;
          errEl.classList.add('show');
          return; // keep the last valid assumptions
        }
        errEl.classList.remove('show');
        state.assumptions = next;
        document.getElementById('val-' + s.id).textContent =
          s.id === 'cpm' ? fmtCurrency(next[s.id]) : fmtPercent(next[s.id]);
        renderView();
      });
    }
  }

  document.getElementById('generated').textContent = 'generated ' + D.generated.split('T')[0];
  document.getElementById('footer').textContent =
    'Quick Edit experiment dashboard · generated ' + D.generated + ' · all statistics computed upstream';
  renderNav();
  renderSliders();
  renderView();
  </script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ResultSource, SyntheticSource};

    #[test]
    fn page_embeds_the_blob_exactly_once() {
        let results = SyntheticSource.load().unwrap();
        let page = render_page(&results, &RenderContext::default()).unwrap();
        assert!(!page.contains(DATA_PLACEHOLDER));
        assert_eq!(page.matches("dashboard-data").count(), 2); // tag id + getElementById
        for v in crate::session::View::ALL {
            assert!(page.contains(v.slug()), "missing view {}", v.slug());
        }
    }

    #[test]
    fn default_estimate_appears_preformatted() {
        let results = SyntheticSource.load().unwrap();
        let page = render_page(&results, &RenderContext::default()).unwrap();
        // Calculator at default sliders reproduces the sample record figure.
        assert!(page.contains("$2,108,638"));
    }

    #[test]
    fn blob_cannot_break_out_of_its_script_tag() {
        let results = SyntheticSource.load().unwrap();
        let data = dashboard_data(&results, &RenderContext::default()).unwrap();
        let blob = serde_json::to_string(&data).unwrap().replace("</", "<\\/");
        assert!(!blob.contains("</script"));
    }

    #[test]
    fn rejects_invalid_context() {
        let results = SyntheticSource.load().unwrap();
        let mut ctx = RenderContext::default();
        ctx.assumptions.adoption_rate = 2.0;
        assert!(render_page(&results, &ctx).is_err());
    }
}
