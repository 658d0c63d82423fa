use crate::calendar::{ViewRange, build_range};
use crate::html::escape_html;
use crate::models::{HabitStore, TrackType};
use crate::series::summarize;
use chrono::NaiveDate;
use std::fmt::Write;

pub fn render_index(store: &HabitStore, today: NaiveDate) -> String {
    let week = build_range(ViewRange::Week, today);
    let mut cards = String::new();
    for habit in &store.habits {
        let summary = summarize(habit, &week, today);
        let unit = habit.unit().map(escape_html).unwrap_or_default();
        let _ = writeln!(
            cards,
            r#"<article class="habit" data-habit="{id}">
  <header>
    <input class="habit-name" value="{name}" aria-label="Habit name" />
    <input class="habit-unit" value="{unit}" placeholder="unit" aria-label="Unit"{unit_state} />
    <button class="habit-delete" type="button" title="Delete habit">&times;</button>
  </header>
  <div class="metrics">
    <span><b data-metric="current">{current}</b> day streak</span>
    <span><b data-metric="best">{best}</b> best</span>
    <span><b data-metric="rate">{rate}</b> this week</span>
  </div>
  <div class="chart-card" data-chart="{id}"></div>
</article>"#,
            id = habit.id,
            name = escape_html(&habit.name),
            unit_state = if habit.track_type() == TrackType::Boolean {
                " disabled"
            } else {
                ""
            },
            current = summary.current_streak,
            best = summary.best_streak,
            rate = summary
                .completion_rate
                .map(|rate| format!("{:.0}%", rate * 100.0))
                .unwrap_or_else(|| "--".to_string()),
        );
    }
    if cards.is_empty() {
        cards.push_str(r#"<p class="hint">No habits yet. Add one above.</p>"#);
    }

    INDEX_HTML
        .replace("{{TODAY}}", &today.format("%Y-%m-%d").to_string())
        .replace("{{HABITS}}", &cards)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    form.create, .habit header, .metrics, .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input, select, button {
      font: inherit;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 8px 12px;
    }

    button {
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      border: none;
    }

    .tab.active {
      background: var(--accent);
    }

    .month-picker {
      display: flex;
      gap: 10px;
      align-items: center;
    }

    #month-label {
      min-width: 90px;
      text-align: center;
      font-weight: 600;
    }

    .habit {
      background: white;
      border-radius: 18px;
      padding: 16px;
      display: grid;
      gap: 12px;
    }

    .habit-name {
      font-weight: 600;
      flex: 1;
    }

    .metrics span {
      color: #6b645d;
    }

    .habit-chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-area {
      fill: var(--accent);
      fill-opacity: 0.12;
      stroke: none;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-point:hover, .chart-point:focus {
      fill: var(--accent);
      outline: none;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .grid-wrap {
      overflow-x: auto;
    }

    .habit-grid {
      border-collapse: separate;
      border-spacing: 3px;
      font-size: 11px;
    }

    .habit-grid th.today {
      color: var(--accent);
    }

    .cell {
      width: 22px;
      height: 22px;
      padding: 0;
      border-radius: 4px;
      border: 1px solid rgba(47, 72, 88, 0.15);
      background: #f6f4f1;
      text-align: center;
      font-size: 10px;
    }

    .cell.numeric {
      width: 34px;
    }

    .cell.done, .cell.filled {
      background: var(--accent-2);
      color: white;
    }

    .cell.today {
      border-color: var(--accent);
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main class="app" data-today="{{TODAY}}">
    <header>
      <h1>Habit Tracker</h1>
      <p class="hint">Today is {{TODAY}}. Click a square to toggle, type a number and press Enter, right-click a number to clear it.</p>
    </header>

    <form class="create" id="create-form">
      <input name="name" placeholder="New habit" required />
      <select name="track_type">
        <option value="boolean">Done / not done</option>
        <option value="numeric">Number per day</option>
      </select>
      <input name="unit" placeholder="unit (numeric only)" />
      <button type="submit">Add habit</button>
    </form>

    <div class="tabs" role="tablist">
      <button class="tab active" type="button" data-range="week">Week</button>
      <button class="tab" type="button" data-range="month">Month</button>
      <button class="tab" type="button" data-range="year">Year</button>
      <div class="month-picker">
        <button id="prev-month" type="button" aria-label="Previous month">&lsaquo;</button>
        <span id="month-label"></span>
        <button id="next-month" type="button" aria-label="Next month">&rsaquo;</button>
      </div>
    </div>

    <section id="habits">
{{HABITS}}
    </section>

    <section class="grid-wrap" id="grid"></section>
    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const gridEl = document.getElementById('grid');
    const monthLabelEl = document.getElementById('month-label');
    const todayId = document.querySelector('.app').dataset.today;
    let activeRange = 'week';
    let year = Number(todayId.slice(0, 4));
    let month = Number(todayId.slice(5, 7));

    const period = () => `year=${year}&month=${month}`;

    const showPeriod = () => {
      monthLabelEl.textContent = `${year}-${String(month).padStart(2, '0')}`;
    };

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const request = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res;
    };

    const loadCharts = async () => {
      const cards = Array.from(document.querySelectorAll('[data-chart]'));
      await Promise.all(cards.map(async (card) => {
        const res = await request('GET', `/api/habits/${card.dataset.chart}/chart?range=${activeRange}&${period()}`);
        card.innerHTML = await res.text();
      }));
    };

    const loadGrid = async () => {
      const res = await request('GET', `/api/grid?${period()}`);
      gridEl.innerHTML = await res.text();
    };

    const loadMetrics = async () => {
      const res = await request('GET', '/api/habits?range=week');
      const habits = await res.json();
      habits.forEach((habit) => {
        const card = document.querySelector(`article[data-habit="${habit.id}"]`);
        if (!card) {
          return;
        }
        const { current_streak, best_streak, completion_rate } = habit.summary;
        card.querySelector('[data-metric="current"]').textContent = current_streak;
        card.querySelector('[data-metric="best"]').textContent = best_streak;
        card.querySelector('[data-metric="rate"]').textContent =
          completion_rate === null ? '--' : `${Math.round(completion_rate * 100)}%`;
      });
    };

    const refresh = () => Promise.all([loadCharts(), loadGrid(), loadMetrics()]);
    const fail = (err) => setStatus(err.message, 'error');

    const sendCell = (cell, body) => {
      const habit = cell.closest('tr').dataset.habit;
      return request('POST', `/api/habits/${habit}/cells/${cell.dataset.date}`, body)
        .then(refresh)
        .catch(fail);
    };

    gridEl.addEventListener('click', (event) => {
      const cell = event.target.closest('.cell.toggle');
      if (cell) {
        sendCell(cell, { action: 'toggle' });
      }
    });

    gridEl.addEventListener('change', (event) => {
      const cell = event.target.closest('.cell.numeric');
      if (cell) {
        sendCell(cell, { action: 'commit', value: cell.value });
      }
    });

    gridEl.addEventListener('keydown', (event) => {
      if (event.key === 'Enter' && event.target.matches('.cell.numeric')) {
        event.target.blur();
      }
    });

    gridEl.addEventListener('contextmenu', (event) => {
      const cell = event.target.closest('.cell.numeric');
      if (cell) {
        event.preventDefault();
        sendCell(cell, { action: 'clear' });
      }
    });

    document.querySelectorAll('.tab').forEach((tab) => {
      tab.addEventListener('click', () => {
        activeRange = tab.dataset.range;
        document.querySelectorAll('.tab').forEach((other) => {
          other.classList.toggle('active', other === tab);
        });
        loadCharts().catch(fail);
      });
    });

    const shiftMonth = (delta) => {
      const index = year * 12 + (month - 1) + delta;
      year = Math.floor(index / 12);
      month = (index % 12) + 1;
      showPeriod();
      Promise.all([loadCharts(), loadGrid()]).catch(fail);
    };

    document.getElementById('prev-month').addEventListener('click', () => shiftMonth(-1));
    document.getElementById('next-month').addEventListener('click', () => shiftMonth(1));

    document.getElementById('create-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      request('POST', '/api/habits', {
        name: form.get('name'),
        track_type: form.get('track_type'),
        unit: form.get('unit')
      })
        .then(() => window.location.reload())
        .catch(fail);
    });

    document.getElementById('habits').addEventListener('change', (event) => {
      const card = event.target.closest('[data-habit]');
      if (!card) {
        return;
      }
      const field = event.target.classList.contains('habit-unit') ? 'unit' : 'name';
      request('PATCH', `/api/habits/${card.dataset.habit}`, { [field]: event.target.value })
        .then(refresh)
        .catch(fail);
    });

    document.getElementById('habits').addEventListener('click', (event) => {
      const card = event.target.closest('[data-habit]');
      if (card && event.target.matches('.habit-delete')) {
        request('DELETE', `/api/habits/${card.dataset.habit}`)
          .then(() => window.location.reload())
          .catch(fail);
      }
    });

    showPeriod();
    refresh().catch(fail);
  </script>
</body>
</html>
"#;
