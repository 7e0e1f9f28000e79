use crate::models::{GoalStatus, GoalSummary, OverallProgress};

pub fn render_index(goals: &[GoalSummary], overall: &OverallProgress, locked: bool) -> String {
    let rows: String = goals.iter().map(|goal| render_row(goal, locked)).collect();
    INDEX_HTML
        .replace("{{OVERALL_PCT}}", &format!("{:.1}", overall.percentage))
        .replace("{{OVERALL_DONE}}", &overall.accumulated.to_string())
        .replace("{{OVERALL_TARGET}}", &overall.target.to_string())
        .replace("{{GOAL_COUNT}}", &goals.len().to_string())
        .replace("{{LOCKED}}", if locked { "true" } else { "false" })
        .replace("{{ROWS}}", &rows)
}

fn render_row(goal: &GoalSummary, locked: bool) -> String {
    let status_class = match goal.status {
        GoalStatus::Complete => "complete",
        GoalStatus::InProgress => "progress",
        GoalStatus::Pending => "pending",
    };
    let password_field = if locked {
        r#"<input class="password" type="password" name="password" placeholder="Password" />"#
    } else {
        ""
    };
    let width = goal.percentage.clamp(0.0, 100.0);
    format!(
        r#"<tr data-goal="{id}">
  <td class="label">{label}</td>
  <td>{target}</td>
  <td><button type="button" class="history-link" data-goal="{id}">{accumulated}</button></td>
  <td>{remaining}</td>
  <td><div class="bar"><span style="width: {width:.1}%"></span></div>{percentage:.1}%</td>
  <td><span class="badge {status_class}">{status}</span></td>
  <td>
    <form class="movement" method="post" action="/goals/{id}/movements">
      <input type="number" name="amount" value="0" step="1" aria-label="Movement" />
      <input type="text" name="note" placeholder="Note (optional)" aria-label="Note" />
      {password_field}
      <button type="submit">Save</button>
    </form>
  </td>
</tr>
"#,
        id = goal.goal_id,
        label = escape_html(&goal.label),
        target = goal.target,
        accumulated = goal.accumulated,
        remaining = goal.remaining,
        percentage = goal.percentage,
        status = goal.status.as_str(),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Progress by goal</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef2f7;
      --bg-2: #c9d8ea;
      --ink: #1f2a37;
      --accent: #1e88e5;
      --accent-2: #e53935;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(31, 42, 55, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f7f9fc 70%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1180px, 100%);
      margin: 0 auto;
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(1.8rem, 3.5vw, 2.5rem);
      margin: 0;
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5b6573;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(31, 42, 55, 0.08);
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7b8594;
    }

    .stat .value {
      display: block;
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.95rem;
    }

    th, td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid rgba(31, 42, 55, 0.08);
      vertical-align: middle;
    }

    th {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #7b8594;
    }

    td.label {
      font-weight: 600;
      max-width: 260px;
    }

    .bar {
      width: 90px;
      height: 8px;
      border-radius: 999px;
      background: rgba(229, 57, 53, 0.25);
      overflow: hidden;
      margin-bottom: 4px;
    }

    .bar span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    .badge {
      border-radius: 999px;
      padding: 4px 10px;
      font-size: 0.8rem;
      font-weight: 600;
    }

    .badge.complete { background: #dff5e3; color: #1b7a33; }
    .badge.progress { background: #e3effc; color: #135ea8; }
    .badge.pending { background: #f1f1f1; color: #6b6b6b; }

    form.movement {
      display: flex;
      gap: 6px;
      flex-wrap: wrap;
    }

    input {
      border: 1px solid rgba(31, 42, 55, 0.2);
      border-radius: 10px;
      padding: 6px 8px;
      font: inherit;
    }

    input[type="number"] { width: 80px; }
    input.password { width: 110px; }

    button {
      border: none;
      border-radius: 999px;
      padding: 7px 14px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.history-link {
      background: transparent;
      color: var(--accent);
      text-decoration: underline;
      padding: 0;
    }

    button.danger { background: var(--accent-2); }

    dialog {
      border: none;
      border-radius: 20px;
      box-shadow: var(--shadow);
      width: min(720px, 95vw);
      padding: 24px;
    }

    .links {
      display: flex;
      gap: 16px;
      flex-wrap: wrap;
    }

    .links a {
      color: var(--accent);
      font-weight: 600;
    }

    .topics {
      display: flex;
      gap: 8px;
      flex-wrap: wrap;
    }

    .topics span {
      background: white;
      border: 1px solid rgba(31, 42, 55, 0.1);
      border-radius: 999px;
      padding: 4px 12px;
    }

    .status {
      min-height: 1.2em;
      color: #5b6573;
    }

    .status.error { color: var(--accent-2); }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Progress by goal</h1>
      <p class="subtitle">Positive movements add progress, negative movements give it back. Totals stay between 0 and each target.</p>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Overall progress</span><span class="value">{{OVERALL_PCT}}%</span></div>
      <div class="stat"><span class="label">Achieved</span><span class="value">{{OVERALL_DONE}}</span></div>
      <div class="stat"><span class="label">Combined target</span><span class="value">{{OVERALL_TARGET}}</span></div>
      <div class="stat"><span class="label">Goals</span><span class="value">{{GOAL_COUNT}}</span></div>
    </section>

    <table>
      <thead>
        <tr>
          <th>Goal</th><th>Target</th><th>Progress</th><th>Remaining</th><th>%</th><th>Status</th><th>Movement</th>
        </tr>
      </thead>
      <tbody>
{{ROWS}}
      </tbody>
    </table>

    <section>
      <h2>Notes by topic</h2>
      <div class="topics" id="topics"></div>
    </section>

    <nav class="links">
      <a href="/export/summary.xlsx">Download workbook</a>
      <a href="/export/summary.csv">Download CSV</a>
    </nav>

    <p class="status" id="status"></p>
  </main>

  <dialog id="history">
    <h2 id="history-title"></h2>
    <table>
      <thead><tr><th>Date</th><th>Amount</th><th>Note</th><th></th></tr></thead>
      <tbody id="history-rows"></tbody>
    </table>
    <p><button type="button" id="history-close">Close</button></p>
  </dialog>

  <script>
    const locked = {{LOCKED}};
    const statusEl = document.getElementById('status');
    const dialog = document.getElementById('history');
    const rowsEl = document.getElementById('history-rows');
    let password = '';

    const setStatus = (text, kind) => {
      statusEl.textContent = text;
      statusEl.className = `status ${kind || ''}`;
    };

    const headers = () => {
      const h = { 'content-type': 'application/json' };
      if (locked) {
        if (!password) {
          password = window.prompt('Password') || '';
        }
        h['x-app-password'] = password;
      }
      return h;
    };

    const call = async (method, url, body) => {
      const res = await fetch(url, { method, headers: headers(), body: body ? JSON.stringify(body) : undefined });
      if (!res.ok) {
        if (res.status === 401) {
          password = '';
        }
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const formatDate = (iso) => iso.split('-').reverse().join('-');

    const cell = (content) => {
      const td = document.createElement('td');
      if (content instanceof Node) {
        td.appendChild(content);
      } else {
        td.textContent = content;
      }
      return td;
    };

    const openHistory = async (goalId) => {
      const res = await fetch(`/api/goals/${goalId}/history`);
      if (!res.ok) {
        throw new Error('Unable to load history');
      }
      const data = await res.json();
      document.getElementById('history-title').textContent = data.goal.label;
      rowsEl.replaceChildren();
      if (data.entries.length === 0) {
        const tr = document.createElement('tr');
        tr.appendChild(cell('No movements recorded yet.'));
        rowsEl.appendChild(tr);
      }
      data.entries.forEach((entry) => {
        const tr = document.createElement('tr');
        const amount = document.createElement('input');
        amount.type = 'number';
        amount.min = '0';
        amount.value = entry.requested_magnitude;
        const note = document.createElement('input');
        note.type = 'text';
        note.value = entry.note;
        const save = document.createElement('button');
        save.textContent = 'Save';
        save.addEventListener('click', () => {
          call('PUT', `/api/movements/${entry.id}`, { magnitude: Number(amount.value) || 0, note: note.value })
            .then(() => window.location.reload())
            .catch((err) => setStatus(err.message, 'error'));
        });
        const remove = document.createElement('button');
        remove.textContent = 'Delete';
        remove.className = 'danger';
        remove.addEventListener('click', () => {
          call('DELETE', `/api/movements/${entry.id}`)
            .then(() => window.location.reload())
            .catch((err) => setStatus(err.message, 'error'));
        });
        const actions = document.createElement('span');
        actions.append(save, ' ', remove);
        tr.append(cell(formatDate(entry.date)), cell(amount), cell(note), cell(actions));
        rowsEl.appendChild(tr);
      });
      dialog.showModal();
    };

    const loadTopics = async () => {
      const res = await fetch('/api/topics');
      if (!res.ok) {
        throw new Error('Unable to load topics');
      }
      const topics = await res.json();
      const el = document.getElementById('topics');
      el.replaceChildren(...topics.map((t) => {
        const span = document.createElement('span');
        span.textContent = `${t.topic}: ${t.count}`;
        return span;
      }));
    };

    document.querySelectorAll('.history-link').forEach((button) => {
      button.addEventListener('click', () => {
        openHistory(button.dataset.goal).catch((err) => setStatus(err.message, 'error'));
      });
    });

    document.getElementById('history-close').addEventListener('click', () => dialog.close());

    loadTopics().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
