use crate::server::model::watchdog::WatchdogSnapshot;

/// Renders the human-readable status page for the supervisor's `/` route.
///
/// Uses the same liveness predicate as `/health`.
pub fn render_status_page(snapshot: &WatchdogSnapshot) -> String {
    let (status, color) = if snapshot.is_healthy() {
        ("Online", "#2ecc71")
    } else {
        ("Offline", "#e74c3c")
    };
    let pid = snapshot
        .pid
        .map(|pid| pid.to_string())
        .unwrap_or_else(|| "-".to_string());
    let last_exit = snapshot
        .last_exit_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Guard-shin Status</title>
<style>
body {{ font-family: sans-serif; background: #2c2f33; color: #ffffff; text-align: center; padding-top: 48px; }}
.status {{ color: {color}; font-size: 1.5em; font-weight: bold; }}
table {{ margin: 24px auto; border-collapse: collapse; }}
td {{ padding: 4px 16px; text-align: left; }}
</style>
</head>
<body>
<h1>Guard-shin</h1>
<p class="status">{status}</p>
<table>
<tr><td>Worker state</td><td>{phase}</td></tr>
<tr><td>Process id</td><td>{pid}</td></tr>
<tr><td>Restarts</td><td>{restarts}</td></tr>
<tr><td>Last exit code</td><td>{last_exit}</td></tr>
</table>
</body>
</html>
"#,
        color = color,
        status = status,
        phase = snapshot.phase,
        pid = pid,
        restarts = snapshot.restarts,
        last_exit = last_exit,
    )
}
