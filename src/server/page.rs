use crate::estimator::MAX_SAME_SPECIES;

/// The form page. The villager list, the estimate and the chart are all
/// fetched from the JSON API.
pub fn index_html() -> String {
    INDEX_HTML
        .replace("{{MAX_TICKETS}}", &u32::MAX.to_string())
        .replace("{{MAX_SAME_SPECIES}}", &MAX_SAME_SPECIES.to_string())
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Villager Hunt Odds</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 1100px; margin: 24px auto; padding: 0 12px; background: #f8f9fa; }
    h1 { text-align: center; color: #007bff; margin-bottom: 24px; }
    .row { display: flex; gap: 16px; flex-wrap: wrap; }
    .card { background: #fff; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,.15); padding: 16px; }
    .form { flex: 1 1 280px; }
    .result { flex: 2 1 520px; }
    label { display: block; margin: 10px 0 4px; font-weight: 600; }
    input, select { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 14px; padding: 8px 14px; background: #007bff; color: #fff; border: 0; border-radius: 4px; }
    #probability-output { color: #007bff; white-space: pre-line; min-height: 1.5em; }
    svg { width: 100%; height: 360px; background: #f8f9fa; }
    .axis { stroke: #999; }
    .curve { fill: none; stroke: #007bff; stroke-width: 2; }
    text { font-size: 12px; fill: #333; }
  </style>
</head>
<body>
  <h1>Animal Crossing Villager Hunt Probability Prediction</h1>
  <div class="row">
    <div class="card form">
      <label for="villager">Select a Villager:</label>
      <select id="villager"><option value="">Select a villager</option></select>
      <label for="tickets">Number of Nook Mile Tickets:</label>
      <input id="tickets" type="number" value="1" min="1" max="{{MAX_TICKETS}}" step="1" />
      <label for="same-species">Number of villagers of the same species on your island:</label>
      <input id="same-species" type="number" value="1" min="0" max="{{MAX_SAME_SPECIES}}" step="1" />
      <button id="calculate">Calculate</button>
    </div>
    <div class="card result">
      <h4 id="probability-output"></h4>
      <svg id="chart" viewBox="0 0 640 360" preserveAspectRatio="none"></svg>
    </div>
  </div>

  <script>
    const villagerEl = document.getElementById('villager');
    const ticketsEl = document.getElementById('tickets');
    const sameEl = document.getElementById('same-species');
    const outputEl = document.getElementById('probability-output');
    const chartEl = document.getElementById('chart');
    const NS = 'http://www.w3.org/2000/svg';

    fetch('/api/villagers').then(r => r.json()).then(data => {
      for (const v of data.villagers) {
        const opt = document.createElement('option');
        opt.value = v.name;
        opt.textContent = v.name + ' (' + v.species + ')';
        villagerEl.appendChild(opt);
      }
    }).catch(() => { outputEl.textContent = 'Unable to load villagers.'; });

    function svgEl(tag, attrs, text) {
      const el = document.createElementNS(NS, tag);
      for (const [k, v] of Object.entries(attrs)) el.setAttribute(k, v);
      if (text !== undefined) el.textContent = text;
      chartEl.appendChild(el);
      return el;
    }

    function drawChart(series, chart) {
      chartEl.innerHTML = '';
      if (!chart) return;
      const w = 640, h = 360, left = 50, right = 20, top = 40, bottom = 40;
      svgEl('text', { x: w / 2, y: 22, 'text-anchor': 'middle', style: 'font-size:18px' }, chart.title);
      svgEl('line', { x1: left, y1: h - bottom, x2: w - right, y2: h - bottom, class: 'axis' });
      svgEl('line', { x1: left, y1: top, x2: left, y2: h - bottom, class: 'axis' });
      svgEl('text', { x: w / 2, y: h - 8, 'text-anchor': 'middle' }, chart.x_axis);
      svgEl('text', { x: 14, y: h / 2, transform: 'rotate(-90 14 ' + (h / 2) + ')', 'text-anchor': 'middle' }, chart.y_axis);
      if (!series.length) return;
      const maxX = Math.max(series[series.length - 1].tickets, 2);
      const maxY = Math.max(...series.map(p => p.probability_pct), 1);
      const sx = x => left + (x - 1) / (maxX - 1) * (w - left - right);
      const sy = y => h - bottom - y / maxY * (h - top - bottom);
      const points = series.map(p => sx(p.tickets).toFixed(1) + ',' + sy(p.probability_pct).toFixed(1)).join(' ');
      svgEl('polyline', { points, class: 'curve' });
      svgEl('text', { x: left - 4, y: top + 4, 'text-anchor': 'end' }, maxY.toFixed(1));
      svgEl('text', { x: w - right, y: h - bottom + 14, 'text-anchor': 'end' }, String(maxX));
    }

    document.getElementById('calculate').addEventListener('click', async () => {
      const num = el => el.value === '' ? null : Number(el.value);
      const payload = {
        villager: villagerEl.value || null,
        tickets: num(ticketsEl),
        same_species: num(sameEl),
      };
      try {
        const response = await fetch('/api/estimate', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(payload),
        });
        const data = await response.json();
        outputEl.textContent = data.message;
        drawChart(data.series || [], data.chart);
      } catch (e) {
        outputEl.textContent = 'Request failed.';
        drawChart([], null);
      }
    });
  </script>
</body>
</html>
"#;
