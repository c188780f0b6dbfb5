//! HTML status page.

use std::fmt::Write;

use actix_web::{HttpResponse, Responder, get, web};
use toxprobe::{NodeStatus, SnapshotStore, StatusReport};

/// Status table of the latest snapshot.
#[get("/")]
pub async fn index_route(store: web::Data<SnapshotStore>) -> impl Responder {
    let snapshot = store.current().await;
    let page = render_page(&StatusReport::from(snapshot.as_ref()));
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(page)
}

fn render_page(report: &StatusReport) -> String {
    let mut page = String::with_capacity(4096 + report.nodes.len() * 512);
    page.push_str(concat!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n",
        "<title>Tox Node Status</title>\n",
        "<style>body{font-family:sans-serif}table{border-collapse:collapse}",
        "td,th{padding:4px 8px;border-bottom:1px solid #ddd}",
        ".online{color:#2a2}.offline{color:#c22}</style>\n",
        "</head>\n<body>\n<h1>Tox Node Status</h1>\n",
    ));

    let _ = writeln!(
        page,
        "<p>{} of {} nodes online. Last scan: {}. <a href=\"/json\">JSON</a></p>",
        report.online(),
        report.nodes.len(),
        escape(&report.last_scan_string)
    );

    page.push_str(concat!(
        "<table>\n<tr><th>IPv4</th><th>IPv6</th><th>Port</th><th>TCP Ports</th>",
        "<th>Public Key</th><th>Maintainer</th><th>Location</th><th>Status</th>",
        "<th>Version</th><th>MOTD</th><th>Last Ping</th></tr>\n",
    ));
    for node in &report.nodes {
        render_row(&mut page, node);
    }
    page.push_str("</table>\n</body>\n</html>\n");
    page
}

fn render_row(page: &mut String, node: &NodeStatus) {
    let tcp_ports = node.tcp_ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ");
    let (class, label) = if node.status { ("online", "Online") } else { ("offline", "Offline") };

    let _ = writeln!(
        page,
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><code>{}</code></td><td>{}</td>\
         <td class=\"flag-{}\">{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape(&node.ipv4),
        escape(&node.ipv6),
        node.port,
        escape(&tcp_ports),
        escape(&node.public_key),
        escape(&node.maintainer),
        escape(&node.location.to_lowercase()),
        escape(&node.location),
        class,
        label,
        escape(&node.version),
        escape(&node.motd),
        escape(&node.last_ping_string),
    );
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
