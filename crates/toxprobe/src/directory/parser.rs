//! Parser for the pipe-delimited node table.
//!
//! ```text
//! | 144.217.167.73 | 2607:5300:201:3100::43c4 | 33445 | 7E5668E0...0F1E | velusip | CA |
//! ```

use tracing::trace;

use crate::model::{NO_IPV6, NodeRecord};

/// Number of fields a row yields once split on `|`.
const FIELD_COUNT: usize = 8;

/// Value used in the IPv6 column for nodes without IPv6.
const IPV6_NONE: &str = "NONE";

/// Parse one directory row. Rows not starting with `|`, with a field count
/// other than eight or with a non-numeric port yield `None`.
pub fn parse_line(line: &str) -> Option<NodeRecord> {
    let line = line.trim();
    if !line.starts_with('|') {
        return None;
    }

    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }

    let port = fields[3].parse::<u16>().ok()?;
    let ipv6 = if fields[2] == IPV6_NONE { NO_IPV6 } else { fields[2] };

    Some(NodeRecord::new(fields[1], ipv6, port, fields[4], fields[5], fields[6]))
}

/// Parse a whole directory, keeping source order and skipping rows that do
/// not describe a node.
pub fn parse_nodes(content: &str) -> Vec<NodeRecord> {
    content
        .lines()
        .filter_map(|line| {
            let node = parse_line(line);
            if node.is_none() && !line.trim().is_empty() {
                trace!("Skipping directory line: {}", line);
            }
            node
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "| 144.217.167.73 | 2607:5300:201:3100::43c4 | 33445 | 7E5668E0EE09E19F320AD47902419331FFEE147BB3606769CFBE921A2A2FD34C | velusip | CA |";

    #[test]
    fn test_parse_line() {
        let node = parse_line(ROW).unwrap();
        assert_eq!(node.ipv4, "144.217.167.73");
        assert_eq!(node.ipv6, "2607:5300:201:3100::43c4");
        assert_eq!(node.port, 33445);
        assert_eq!(
            node.public_key,
            "7E5668E0EE09E19F320AD47902419331FFEE147BB3606769CFBE921A2A2FD34C"
        );
        assert_eq!(node.maintainer, "velusip");
        assert_eq!(node.location, "CA");
        assert!(!node.status);
        assert_eq!(node.last_ping, 0);
    }

    #[test]
    fn test_parse_line_ipv6_none() {
        let node = parse_line("| 1.2.3.4 | NONE | 443 | AABB | Some One | DE |").unwrap();
        assert_eq!(node.ipv6, "-");
        assert_eq!(node.maintainer, "Some One");
    }

    #[test]
    fn test_parse_line_requires_leading_pipe() {
        assert!(parse_line("1.2.3.4 | NONE | 443 | AABB | x | DE |").is_none());
        assert!(parse_line("^ IPv4 ^ IPv6 ^ Port ^ Public Key ^ Maintainer ^ Location ^").is_none());
    }

    #[test]
    fn test_parse_line_non_numeric_port() {
        assert!(parse_line("| 1.2.3.4 | NONE | port | AABB | x | DE |").is_none());
        assert!(parse_line("| 1.2.3.4 | NONE | 70000 | AABB | x | DE |").is_none());
    }

    #[test]
    fn test_parse_line_wrong_field_count() {
        assert!(parse_line("| 1.2.3.4 | NONE | 443 | AABB | x |").is_none());
        assert!(parse_line("| 1.2.3.4 | NONE | 443 | AABB | x | DE | extra |").is_none());
        assert!(parse_line("|").is_none());
    }

    #[test]
    fn test_parse_nodes_keeps_order() {
        let content = format!(
            "====== Nodes ======\n\n{}\n| 5.6.7.8 | NONE | 3389 | CCDD | b | US |\nnot a row\n",
            ROW
        );
        let nodes = parse_nodes(&content);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].ipv4, "144.217.167.73");
        assert_eq!(nodes[1].ipv4, "5.6.7.8");
    }
}
