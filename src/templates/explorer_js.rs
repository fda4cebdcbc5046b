//! Generated D3 force-graph script for the explorer page.
//!
//! The server owns the graph data; this script owns nothing but the
//! rendering loop. Every seed/expand response carries a full snapshot and
//! the renderer rebuilds the SVG from it, so repeated renders are
//! idempotent and partial states are never shown. Layout, zoom/pan, and
//! collision handling are all D3's.

use serde_json::json;

/// Configuration interpolated into the generated script.
pub struct ExplorerJsConfig {
    /// CSS selector for the SVG element (e.g. "#graph").
    pub container_selector: String,
    pub graph_url: String,
    pub seed_url: String,
    pub expand_url: String,
    pub default_topic: String,
    pub default_limit: u32,
}

const D3_TAG: &str = r#"<script src="https://d3js.org/d3.v7.min.js"></script>"#;

/// Returns the `<script src="d3">` tag plus the explorer engine IIFE.
pub fn render_explorer_js(config: &ExplorerJsConfig) -> String {
    let cfg_json = json!({
        "container": config.container_selector,
        "graphUrl": config.graph_url,
        "seedUrl": config.seed_url,
        "expandUrl": config.expand_url,
        "defaultTopic": config.default_topic,
        "defaultLimit": config.default_limit,
    });

    let mut out = String::new();
    out.push_str(D3_TAG);
    out.push_str("\n<script>\n(function() {\n");
    out.push_str(&format!("const CFG = {};\n", cfg_json));
    out.push_str(EXPLORER_JS_BODY);
    out.push_str("})();\n</script>\n");
    out
}

const EXPLORER_JS_BODY: &str = r#"
const form = document.getElementById('explore-form');
if (!form) return;

const topicEl = document.getElementById('ex-topic');
const langEl = document.getElementById('ex-language');
const limitEl = document.getElementById('ex-limit');
const statusEl = document.getElementById('ex-status');

const svg = d3.select(CFG.container);
const width = () => svg.node().clientWidth;
const height = () => svg.node().clientHeight;

let sim = null;

function setStatus(msg, level) {
    if (!statusEl) return;
    statusEl.textContent = msg;
    statusEl.className = level === 'error' ? 'status-line error' : 'status-line';
}

function setStats(stats) {
    const topics = document.getElementById('ex-stat-topics');
    const repos = document.getElementById('ex-stat-repos');
    const edges = document.getElementById('ex-stat-edges');
    if (topics) topics.textContent = stats.topic_count;
    if (repos) repos.textContent = stats.repo_count;
    if (edges) edges.textContent = stats.edge_count;
}

function nodeColor(d) {
    return d.kind === 'topic' ? getComputedStyle(document.documentElement).getPropertyValue('--topic') : getComputedStyle(document.documentElement).getPropertyValue('--repo');
}

async function postJson(url, payload) {
    const res = await fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(payload)
    });
    if (!res.ok) {
        const text = await res.text();
        throw new Error('Server error ' + res.status + ': ' + text);
    }
    return res.json();
}

function applyResponse(resp) {
    setStatus(resp.status, resp.level);
    setStats(resp.graph.stats);
    render(resp.graph);
}

// Full redraw from a snapshot. The previous SVG contents are discarded
// every time, so a re-render can never show a stale partial graph.
function render(data) {
    const nodeArr = data.nodes.map(n => Object.assign({}, n));
    const linkArr = data.edges.map(e => ({ source: e.source, target: e.target }));

    svg.selectAll('*').remove();

    const g = svg.append('g');
    const zoom = d3.zoom().on('zoom', (ev) => { g.attr('transform', ev.transform); });
    svg.call(zoom);

    const linkSel = g.append('g')
        .attr('stroke', 'rgba(0,0,0,0.2)')
        .attr('stroke-width', 1)
        .selectAll('line')
        .data(linkArr)
        .enter()
        .append('line');

    const nodeSel = g.append('g')
        .selectAll('circle')
        .data(nodeArr, d => d.id)
        .enter()
        .append('circle')
        .attr('r', d => d.kind === 'topic' ? 8 : 6)
        .attr('fill', nodeColor)
        .attr('stroke', '#fff')
        .attr('stroke-width', 1)
        .style('cursor', 'pointer')
        .on('click', onNodeClick);

    nodeSel.append('title').text(d => {
        if (d.kind === 'repo') return d.label + '\n' + (d.url || '');
        return d.label || d.id;
    });

    const labelSel = g.append('g')
        .selectAll('text')
        .data(nodeArr, d => d.id)
        .enter()
        .append('text')
        .text(d => d.kind === 'topic' ? d.label : '')
        .attr('font-size', 10)
        .attr('fill', '#333');

    // Stronger repulsion on topics keeps spokes open; gentle x/y centering
    // stops drift; alpha reheated on every (re)render.
    sim = d3.forceSimulation(nodeArr)
        .force('charge', d3.forceManyBody().strength(d => d.kind === 'topic' ? -120 : -35))
        .force('link', d3.forceLink(linkArr).id(d => d.id).distance(70).strength(0.8))
        .force('center', d3.forceCenter(width() / 2, height() / 2))
        .force('x', d3.forceX(width() / 2).strength(0.05))
        .force('y', d3.forceY(height() / 2).strength(0.05))
        .force('collide', d3.forceCollide(d => d.kind === 'topic' ? 12 : 9))
        .alpha(1)
        .alphaDecay(0.06)
        .on('tick', () => {
            linkSel
                .attr('x1', d => d.source.x)
                .attr('y1', d => d.source.y)
                .attr('x2', d => d.target.x)
                .attr('y2', d => d.target.y);
            nodeSel
                .attr('cx', d => d.x)
                .attr('cy', d => d.y);
            labelSel
                .attr('x', d => d.x + 8)
                .attr('y', d => d.y + 4);
        });
}

window.addEventListener('resize', () => {
    if (!sim) return;
    sim.force('center', d3.forceCenter(width() / 2, height() / 2));
    sim.force('x', d3.forceX(width() / 2).strength(0.05));
    sim.force('y', d3.forceY(height() / 2).strength(0.05));
    sim.alpha(0.5).restart();
});

async function onNodeClick(event, d) {
    if (d.kind === 'repo') {
        if (d.url) window.open(d.url, '_blank', 'noopener');
        return;
    }
    if (d.kind !== 'topic') return;
    try {
        setStatus('Expanding topic ' + d.label + '…');
        const resp = await postJson(CFG.expandUrl, { id: d.id, language: (langEl.value || '').trim() });
        applyResponse(resp);
    } catch (e) {
        console.error(e);
        setStatus(e.message || 'Failed to expand topic', 'error');
    }
}

async function explore() {
    const topic = (topicEl.value || '').trim() || CFG.defaultTopic;
    const language = (langEl.value || '').trim();
    const limit = parseInt(limitEl.value || String(CFG.defaultLimit), 10) || CFG.defaultLimit;
    try {
        setStatus('Loading repositories…');
        const resp = await postJson(CFG.seedUrl, { topic: topic, language: language, limit: limit });
        applyResponse(resp);
    } catch (e) {
        console.error(e);
        setStatus(e.message || 'Failed to load repositories', 'error');
    }
}

form.addEventListener('submit', (e) => { e.preventDefault(); explore(); });
const clearBtn = document.getElementById('ex-clear');
if (clearBtn) {
    clearBtn.addEventListener('click', () => {
        topicEl.value = CFG.defaultTopic;
        langEl.value = '';
        limitEl.value = String(CFG.defaultLimit);
        explore();
    });
}

// The graph lives on the server, so a page load first tries to restore
// what is already there; only an empty store triggers a fresh seed.
(async function init() {
    try {
        const res = await fetch(CFG.graphUrl);
        if (res.ok) {
            const data = await res.json();
            if (data.nodes && data.nodes.length > 0) {
                setStats(data.stats);
                render(data);
                setStatus('Restored ' + data.nodes.length + ' nodes. Click a topic node to expand.');
                return;
            }
        }
    } catch (e) {
        console.error(e);
    }
    explore();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_interpolates_config() {
        let config = ExplorerJsConfig {
            container_selector: "#graph".to_string(),
            graph_url: "/api/graph".to_string(),
            seed_url: "/api/graph/seed".to_string(),
            expand_url: "/api/graph/expand".to_string(),
            default_topic: "threejs".to_string(),
            default_limit: 50,
        };
        let js = render_explorer_js(&config);
        assert!(js.contains("d3.v7.min.js"));
        assert!(js.contains(r##""container":"#graph""##));
        assert!(js.contains(r#""seedUrl":"/api/graph/seed""#));
        assert!(js.contains(r#""defaultTopic":"threejs""#));
        assert!(js.contains("forceSimulation"));
    }
}
