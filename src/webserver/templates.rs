/// HTML templates for the embedded dashboard
///
/// The page is rendered server-side from the same models the JSON API
/// serves; the inline script only wires forms, copy buttons and note edits
/// to the API and reloads.
use crate::dashboard::DashboardSummary;
use crate::views::chart::escape_xml as escape;
use crate::views::{ChartView, TableSnapshot};
use std::fmt::Write as _;

const CHART_WIDTH: u32 = 640;
const CHART_HEIGHT: u32 = 180;

/// Full dashboard page
pub fn dashboard_page(
    summary: &DashboardSummary,
    table: &TableSnapshot,
    charts: &ChartView,
    refresh_secs: u64,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Subnet Miner Monitor</title>
    <style>{styles}</style>
</head>
<body>
    <header class="header">
        <h1>Subnet Miner Monitor</h1>
        <span class="badge">{status}</span>
    </header>
    <main class="content">
        {banners}
        {cards}
        {controls}
        {table}
        {charts}
    </main>
    <script>
        const REFRESH_MS = {refresh_ms};
        {scripts}
    </script>
</body>
</html>"#,
        styles = styles(),
        status = if summary.loading { "Refreshing..." } else { "Live" },
        banners = banners(summary),
        cards = summary_cards(summary),
        controls = controls(summary),
        table = table_section(table),
        charts = charts_section(charts),
        refresh_ms = refresh_secs.max(1) * 1000,
        scripts = scripts(),
    )
}

fn banners(summary: &DashboardSummary) -> String {
    let mut html = String::new();
    if let Some(error) = &summary.error {
        let _ = write!(html, r#"<div class="banner error">{}</div>"#, escape(error));
    }
    if let Some(success) = &summary.success {
        let _ = write!(html, r#"<div class="banner success">{}</div>"#, escape(success));
    }
    html
}

fn summary_cards(summary: &DashboardSummary) -> String {
    let a = &summary.aggregates;
    let s = &summary.settings;
    let cards = [
        ("Subnet", s.subnet_id.clone().unwrap_or_else(|| "-".to_string())),
        ("Alpha Price", format!("{:.4}", summary.prices.subnet_price)),
        ("TAO Price", format!("${:.2}", summary.prices.base_price)),
        ("Reg Cost", format!("{:.4}", s.reg_cost)),
        ("Registration", if s.reg_allowed { "Allowed" } else { "Closed" }.to_string()),
        ("Immune Period", summary.immune_period_display.clone()),
        ("Total Miners", a.total_miner_num.to_string()),
        ("Registered", a.registered_miner_num.to_string()),
        ("Deregistered", a.deregistered_miner_num.to_string()),
        ("Total Staking", format!("{:.2}", a.total_staking_alpha)),
        ("Staking USD", format!("${:.2}", a.total_staking_usd)),
        ("Daily Alpha", format!("{:.2}", a.total_daily_alpha)),
        ("Daily Earn USD", format!("${:.2}", a.daily_earn_usd)),
    ];

    let mut html = String::from(r#"<section class="cards">"#);
    for (label, value) in cards {
        let _ = write!(
            html,
            r#"<div class="card"><div class="label">{}</div><div class="value">{}</div></div>"#,
            label,
            escape(&value)
        );
    }
    html.push_str("</section>");
    html
}

fn controls(summary: &DashboardSummary) -> String {
    let mut coldkeys = String::new();
    for key in &summary.coldkeys {
        let _ = write!(
            coldkeys,
            r#"<li><code>{k}</code> <button class="link" data-remove="{k}">remove</button></li>"#,
            k = escape(key)
        );
    }

    format!(
        r#"<section class="controls">
    <form id="subnetForm"><input name="subnet" placeholder="Subnet id" value="{subnet}"><button>Update subnet</button></form>
    <form id="coldkeyForm"><input name="coldkey" placeholder="Coldkey"><button>Register coldkey</button></form>
    <button id="refreshBtn">Refresh now</button>
    <ul class="coldkeys">{coldkeys}</ul>
</section>"#,
        subnet = escape(summary.settings.subnet_id.as_deref().unwrap_or_default()),
        coldkeys = coldkeys,
    )
}

fn table_section(table: &TableSnapshot) -> String {
    let mut html = String::from(r#"<section><h2>Miners</h2><div class="table-wrap"><table><thead><tr>"#);
    for column in &table.columns {
        let min = column
            .min_width
            .map(|w| format!("min-width:{}px;", w))
            .unwrap_or_default();
        let _ = write!(
            html,
            r#"<th class="{pinned}" style="{min}max-width:{max}px">{header}<br><input class="filter" data-column="{id}" placeholder="filter"></th>"#,
            pinned = if column.pinned { "pinned" } else { "" },
            min = min,
            max = column.max_width,
            header = column.header,
            id = column.id,
        );
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        let _ = write!(html, r#"<tr data-key="{}">"#, escape(&row.symbol_key));
        for column in &table.columns {
            let value = row.cells.get(column.id).map(String::as_str).unwrap_or_default();
            let class = if column.pinned { "pinned" } else { "" };
            if column.editable {
                let _ = write!(
                    html,
                    r#"<td class="{}"><input class="note" data-key="{}" value="{}"></td>"#,
                    class,
                    escape(&row.symbol_key),
                    escape(value)
                );
            } else if column.copyable {
                let _ = write!(
                    html,
                    r#"<td class="{}" data-column="{}"><span class="mono">{v}</span> <button class="copy" data-copy="{v}" title="Copy">⧉</button></td>"#,
                    class,
                    column.id,
                    v = escape(value)
                );
            } else {
                let _ = write!(
                    html,
                    r#"<td class="{}" data-column="{}">{}</td>"#,
                    class,
                    column.id,
                    escape(value)
                );
            }
        }
        html.push_str("</tr>");
    }

    let _ = write!(
        html,
        r#"</tbody></table></div><p class="muted">{} of {} miners</p></section>"#,
        table.rows.len(),
        table.total_rows
    );
    html
}

fn charts_section(charts: &ChartView) -> String {
    let mut html = String::from(r#"<section><h2>Daily Alpha (USD)</h2>"#);
    if let Some(message) = charts.empty_message {
        let _ = write!(html, r#"<p class="muted">{}</p>"#, message);
    }
    html.push_str(r#"<div class="charts">"#);
    for series in &charts.series {
        let _ = write!(
            html,
            r#"<figure class="chart"><figcaption>{} <span class="muted">{}</span></figcaption>{}</figure>"#,
            escape(&series.label),
            series.latest.map(|v| format!("${:.2}", v)).unwrap_or_default(),
            series.to_svg(CHART_WIDTH, CHART_HEIGHT)
        );
    }
    html.push_str("</div></section>");
    html
}

/// Common CSS styles
fn styles() -> &'static str {
    r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f5f5f7; color: #222; }
        .header { display: flex; justify-content: space-between; align-items: center; padding: 16px 24px; background: #1f2937; color: #fff; }
        .badge { background: #10b981; padding: 4px 10px; border-radius: 12px; font-size: 12px; }
        .content { padding: 24px; display: flex; flex-direction: column; gap: 24px; }
        .banner { padding: 10px 14px; border-radius: 6px; }
        .banner.error { background: #fee2e2; color: #991b1b; }
        .banner.success { background: #dcfce7; color: #166534; }
        .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(150px, 1fr)); gap: 12px; }
        .card { background: #fff; border-radius: 8px; padding: 12px; box-shadow: 0 1px 2px rgba(0,0,0,.06); }
        .card .label { font-size: 12px; color: #6b7280; }
        .card .value { font-size: 18px; font-weight: 600; }
        .controls { display: flex; flex-wrap: wrap; gap: 12px; align-items: center; }
        .controls input { padding: 6px 8px; border: 1px solid #d1d5db; border-radius: 4px; }
        button { padding: 6px 10px; border: 0; border-radius: 4px; background: #2563eb; color: #fff; cursor: pointer; }
        button.link, button.copy { background: none; color: #2563eb; padding: 0 4px; }
        .coldkeys { list-style: none; width: 100%; }
        .table-wrap { overflow-x: auto; background: #fff; border-radius: 8px; }
        table { border-collapse: collapse; width: 100%; font-size: 13px; }
        th, td { padding: 6px 8px; border-bottom: 1px solid #eee; text-align: left; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
        th.pinned, td.pinned { position: sticky; left: 0; background: #fff; }
        input.filter { width: 100%; margin-top: 4px; font-size: 11px; }
        input.note { width: 100%; border: 1px solid transparent; background: transparent; }
        input.note:focus { border-color: #2563eb; background: #fff; }
        .mono { font-family: ui-monospace, monospace; }
        .muted { color: #6b7280; font-size: 12px; }
        .charts { display: grid; grid-template-columns: repeat(auto-fill, minmax(420px, 1fr)); gap: 16px; }
        .chart { background: #fff; border-radius: 8px; padding: 8px; }
    "#
}

/// Inline client script
fn scripts() -> &'static str {
    r#"
        async function api(method, path, body) {
            const res = await fetch('/api' + path, {
                method,
                headers: { 'Content-Type': 'application/json' },
                body: body ? JSON.stringify(body) : undefined,
            });
            return res.json();
        }

        document.getElementById('subnetForm').addEventListener('submit', async (e) => {
            e.preventDefault();
            await api('POST', '/subnet', { subnet: e.target.subnet.value });
            location.reload();
        });

        document.getElementById('coldkeyForm').addEventListener('submit', async (e) => {
            e.preventDefault();
            await api('POST', '/coldkeys', { coldkey: e.target.coldkey.value });
            location.reload();
        });

        document.getElementById('refreshBtn').addEventListener('click', async () => {
            await api('POST', '/refresh');
            location.reload();
        });

        document.querySelectorAll('[data-remove]').forEach((btn) => {
            btn.addEventListener('click', async () => {
                await api('DELETE', '/coldkeys/' + encodeURIComponent(btn.dataset.remove));
                location.reload();
            });
        });

        // Copy must not trigger the row's own click handling
        document.querySelectorAll('button.copy').forEach((btn) => {
            btn.addEventListener('click', (event) => {
                event.stopPropagation();
                navigator.clipboard.writeText(btn.dataset.copy);
            });
        });

        document.querySelectorAll('input.note').forEach((input) => {
            input.addEventListener('click', (event) => event.stopPropagation());
            input.addEventListener('change', async () => {
                const res = await api('PUT', '/notes/' + encodeURIComponent(input.dataset.key), { note: input.value });
                input.value = res.note || '';
            });
        });

        document.querySelectorAll('input.filter').forEach((input) => {
            input.addEventListener('input', () => {
                const filters = Array.from(document.querySelectorAll('input.filter'))
                    .filter((f) => f.value.trim() !== '')
                    .map((f) => [f.dataset.column, f.value.trim().toLowerCase()]);
                document.querySelectorAll('tbody tr').forEach((row) => {
                    const visible = filters.every(([column, needle]) => {
                        const cell = row.querySelector('[data-column="' + column + '"]');
                        const note = column === 'symbol_notes' ? row.querySelector('input.note') : null;
                        const text = note ? note.value : (cell ? cell.textContent : '');
                        return text.toLowerCase().includes(needle);
                    });
                    row.style.display = visible ? '' : 'none';
                });
            });
        });

        setTimeout(() => {
            if (!document.activeElement || document.activeElement.tagName !== 'INPUT') {
                location.reload();
            }
        }, REFRESH_MS);
    "#
}
