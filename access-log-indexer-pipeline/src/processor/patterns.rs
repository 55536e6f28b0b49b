//! Built-in Grok pattern definitions.

/// Classic load balancer access log line.
pub const ELB_LINE_PATTERN: &str = concat!(
    r#"%{TIMESTAMP_ISO8601:timestamp} %{NOTSPACE:elb} %{IP:clientip}:%{INT:clientport:int} "#,
    r#"(?:(%{IP:backendip}:?:%{INT:backendport:int})|-) "#,
    r#"%{NUMBER:request_processing_time:float} %{NUMBER:backend_processing_time:float} "#,
    r#"%{NUMBER:response_processing_time:float} "#,
    r#"(?:-|%{INT:elb_status_code:int}) (?:-|%{INT:backend_status_code:int}) "#,
    r#"%{INT:received_bytes:int} %{INT:sent_bytes:int} "#,
    r#""%{ELB_REQUEST_LINE}" "(?:-|%{DATA:user_agent})" "#,
    r#"(?:-|%{NOTSPACE:ssl_cipher}) (?:-|%{NOTSPACE:ssl_protocol})"#,
);

/// Application load balancer access log line (gzip-delivered objects).
pub const ALB_LINE_PATTERN: &str = concat!(
    r#"%{NOTSPACE:conn_type} "#,
    r#"%{TIMESTAMP_ISO8601:timestamp} %{NOTSPACE:elb} %{IP:clientip}:%{INT:clientport:int} "#,
    r#"(?:(%{IP:backendip}:?:%{INT:backendport:int})|-) "#,
    r#"%{NUMBER:request_processing_time:float} %{NUMBER:backend_processing_time:float} "#,
    r#"%{NUMBER:response_processing_time:float} "#,
    r#"(?:-|%{INT:elb_status_code:int}) (?:-|%{INT:backend_status_code:int}) "#,
    r#"%{INT:received_bytes:int} %{INT:sent_bytes:int} "#,
    r#""%{ELB_REQUEST_LINE}" "(?:-|%{DATA:user_agent})" "#,
    r#"(?:-|%{NOTSPACE:ssl_cipher}) (?:-|%{NOTSPACE:ssl_protocol}) "#,
    r#"%{NOTSPACE:target_group} "Root=%{NOTSPACE:trace_id}""#,
);

/// Splits a `host:port` token.
pub const HOST_PORT_PATTERN: &str = "%{DATA:domain}:%{DATA:inboundport}";

const HEX16: &str = "[0-9A-Fa-f]{1,4}";

/// Name and definition of every pattern in the default library.
pub(crate) fn builtin_patterns() -> Vec<(&'static str, String)> {
    let ipv6 = [
        format!("(?:{h}:){{7}}{h}", h = HEX16),
        format!("(?:{h}:){{1,7}}:", h = HEX16),
        format!("(?:{h}:){{1,6}}:{h}", h = HEX16),
        format!("(?:{h}:){{1,5}}(?::{h}){{1,2}}", h = HEX16),
        format!("::(?:{h}:){{0,5}}{h}", h = HEX16),
        "::".to_string(),
    ]
    .join("|");

    let fixed: &[(&str, &str)] = &[
        ("USERNAME", r"[a-zA-Z0-9._-]+"),
        ("USER", r"%{USERNAME}"),
        ("INT", r"(?:[+-]?(?:[0-9]+))"),
        ("BASE10NUM", r"(?:[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+))"),
        ("NUMBER", r"(?:%{BASE10NUM})"),
        ("POSINT", r"\b(?:[1-9][0-9]*)\b"),
        ("NONNEGINT", r"\b(?:[0-9]+)\b"),
        ("WORD", r"\b\w+\b"),
        ("NOTSPACE", r"\S+"),
        ("SPACE", r"\s*"),
        ("DATA", r".*?"),
        ("GREEDYDATA", r".*"),
        (
            "IPV4",
            r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)",
        ),
        ("IP", r"(?:%{IPV6}|%{IPV4})"),
        (
            "HOSTNAME",
            r"\b(?:[0-9A-Za-z][0-9A-Za-z-]{0,62})(?:\.(?:[0-9A-Za-z][0-9A-Za-z-]{0,62}))*\.?",
        ),
        ("IPORHOST", r"(?:%{IP}|%{HOSTNAME})"),
        ("URIPROTO", r"[A-Za-z][A-Za-z0-9+.\-]*"),
        ("URIHOST", r"%{IPORHOST}(?::%{POSINT:port})?"),
        ("URIPATH", r"(?:/[A-Za-z0-9$.+!*'(){},\~:;=@\#%\&_\-]*)+"),
        ("URIPARAM", r"\?[A-Za-z0-9$.+!*'|(){},\~@\#%\&/=:;_?\-\[\]<>]*"),
        ("URIPATHPARAM", r"%{URIPATH}(?:%{URIPARAM})?"),
        ("YEAR", r"(?:\d\d){1,2}"),
        ("MONTHNUM", r"(?:0?[1-9]|1[0-2])"),
        ("MONTHDAY", r"(?:(?:0[1-9])|(?:[12][0-9])|(?:3[01])|[1-9])"),
        ("HOUR", r"(?:2[0123]|[01]?[0-9])"),
        ("MINUTE", r"(?:[0-5][0-9])"),
        ("SECOND", r"(?:(?:[0-5]?[0-9]|60)(?:[:.,][0-9]+)?)"),
        ("ISO8601_TIMEZONE", r"(?:Z|[+-]%{HOUR}(?::?%{MINUTE}))"),
        (
            "TIMESTAMP_ISO8601",
            r"%{YEAR}-%{MONTHNUM}-%{MONTHDAY}[T ]%{HOUR}:?%{MINUTE}(?::?%{SECOND})?%{ISO8601_TIMEZONE}?",
        ),
        ("ELB_URIPATHPARAM", r"%{URIPATH:path}(?:%{URIPARAM:params})?"),
        (
            "ELB_URI",
            r"%{URIPROTO:proto}://(?:%{USER}(?::[^@]*)?@)?(?:%{URIHOST:urihost})?(?:%{ELB_URIPATHPARAM})?",
        ),
        (
            "ELB_REQUEST_LINE",
            r"(?:%{WORD:verb} %{ELB_URI:request}(?: HTTP/%{NUMBER:httpversion})?|%{DATA:rawrequest})",
        ),
    ];

    let mut patterns: Vec<(&'static str, String)> = fixed
        .iter()
        .map(|(name, definition)| (*name, definition.to_string()))
        .collect();
    patterns.push(("IPV6", format!("(?:{})", ipv6)));
    patterns
}
