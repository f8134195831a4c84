// src/patterns.rs - Preset regex patterns for common access log formats
//
// Within a preset the patterns are ordered richest first, since the decoder
// stops at the first one that matches.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

const APACHE_COMBINED: &str = concat!(
    r#"^(?P<remote_host>\S+) (?P<remote_logname>\S+) (?P<remote_user>\S+) "#,
    r#"\[(?P<datetime>[^\]]+)\] "(?P<method>[A-Z]+) (?P<request_uri>[^ "]+) (?P<protocol>HTTP/[0-9.]+)" "#,
    r#"(?P<status>[0-9]{3}) (?P<size>[0-9]+|-) "(?P<referer>[^"]*)" "(?P<user_agent>[^"]*)"$"#,
);

const APACHE_COMMON: &str = concat!(
    r#"^(?P<remote_host>\S+) (?P<remote_logname>\S+) (?P<remote_user>\S+) "#,
    r#"\[(?P<datetime>[^\]]+)\] "(?P<method>[A-Z]+) (?P<request_uri>[^ "]+) (?P<protocol>HTTP/[0-9.]+)" "#,
    r#"(?P<status>[0-9]{3}) (?P<size>[0-9]+|-)$"#,
);

const S3_HEAD: &str = concat!(
    r#"^(?P<bucket_owner>\S+) (?P<bucket>\S+) \[(?P<time>[^\]]+)\] (?P<remote_ip>\S+) "#,
    r#"(?P<requester>\S+) (?P<request_id>\S+) (?P<operation>\S+) (?P<key>\S+) "#,
    r#""(?P<request_uri>[^"]*)" (?P<http_status>\S+) (?P<error_code>\S+) (?P<bytes_sent>\S+) "#,
    r#"(?P<object_size>\S+) (?P<total_time>\S+) (?P<turn_around_time>\S+) "#,
    r#""(?P<referer>[^"]*)" "(?P<user_agent>[^"]*)" (?P<version_id>\S+)"#,
);

const S3_FULL: &str = concat!(
    r#"^(?P<bucket_owner>\S+) (?P<bucket>\S+) \[(?P<time>[^\]]+)\] (?P<remote_ip>\S+) "#,
    r#"(?P<requester>\S+) (?P<request_id>\S+) (?P<operation>\S+) (?P<key>\S+) "#,
    r#""(?P<request_uri>[^"]*)" (?P<http_status>\S+) (?P<error_code>\S+) (?P<bytes_sent>\S+) "#,
    r#"(?P<object_size>\S+) (?P<total_time>\S+) (?P<turn_around_time>\S+) "#,
    r#""(?P<referer>[^"]*)" "(?P<user_agent>[^"]*)" (?P<version_id>\S+) "#,
    r#"(?P<host_id>\S+) (?P<signature_version>\S+) (?P<cipher_suite>\S+) "#,
    r#"(?P<authentication_type>\S+) (?P<host_header>\S+) (?P<tls_version>\S+) "#,
    r#"(?P<access_point_arn>\S+) (?P<acl_required>\S+)$"#,
);

const CLB: &str = concat!(
    r#"^(?P<time>\S+) (?P<elb>\S+) (?P<client_port>\S+) (?P<backend_port>\S+) "#,
    r#"(?P<request_processing_time>\S+) (?P<backend_processing_time>\S+) (?P<response_processing_time>\S+) "#,
    r#"(?P<elb_status_code>\S+) (?P<backend_status_code>\S+) (?P<received_bytes>\S+) (?P<sent_bytes>\S+) "#,
    r#""(?P<method>\S+) (?P<request_uri>\S+) (?P<protocol>[^"]*)" "(?P<user_agent>[^"]*)" "#,
    r#"(?P<ssl_cipher>\S+) (?P<ssl_protocol>\S+)$"#,
);

const ALB_HEAD: &str = concat!(
    r#"^(?P<type>\S+) (?P<time>\S+) (?P<elb>\S+) (?P<client_port>\S+) (?P<target_port>\S+) "#,
    r#"(?P<request_processing_time>\S+) (?P<target_processing_time>\S+) (?P<response_processing_time>\S+) "#,
    r#"(?P<elb_status_code>\S+) (?P<target_status_code>\S+) (?P<received_bytes>\S+) (?P<sent_bytes>\S+) "#,
    r#""(?P<method>\S+) (?P<request_uri>\S+) (?P<protocol>[^"]*)" "(?P<user_agent>[^"]*)" "#,
    r#"(?P<ssl_cipher>\S+) (?P<ssl_protocol>\S+) (?P<target_group_arn>\S+) "(?P<trace_id>[^"]*)" "#,
    r#""(?P<domain_name>[^"]*)" "(?P<chosen_cert_arn>[^"]*)" (?P<matched_rule_priority>\S+) "#,
    r#"(?P<request_creation_time>\S+) "(?P<actions_executed>[^"]*)" "(?P<redirect_url>[^"]*)" "#,
    r#""(?P<error_reason>[^"]*)" "(?P<target_port_list>[^"]*)" "(?P<target_status_code_list>[^"]*)" "#,
    r#""(?P<classification>[^"]*)" "(?P<classification_reason>[^"]*)""#,
);

const NLB: &str = concat!(
    r#"^(?P<type>\S+) (?P<version>\S+) (?P<time>\S+) (?P<elb>\S+) (?P<listener>\S+) "#,
    r#"(?P<client_port>\S+) (?P<destination_port>\S+) (?P<connection_time>\S+) "#,
    r#"(?P<tls_handshake_time>\S+) (?P<received_bytes>\S+) (?P<sent_bytes>\S+) "#,
    r#"(?P<incoming_tls_alert>\S+) (?P<chosen_cert_arn>\S+) (?P<chosen_cert_serial>\S+) "#,
    r#"(?P<tls_cipher>\S+) (?P<tls_protocol_version>\S+) (?P<tls_named_group>\S+) "#,
    r#"(?P<domain_name>\S+) (?P<alpn_fe_protocol>\S+) (?P<alpn_be_protocol>\S+) "#,
    r#"(?P<alpn_client_preference_list>\S+) (?P<tls_connection_creation_time>\S+)$"#,
);

/// Full ALB line including the trailing connection trace id
static ALB_FULL: Lazy<String> = Lazy::new(|| format!(r"{} (?P<conn_trace_id>\S+)$", ALB_HEAD));
static ALB_LEGACY: Lazy<String> = Lazy::new(|| format!("{}$", ALB_HEAD));
static S3_LEGACY: Lazy<String> = Lazy::new(|| format!("{}$", S3_HEAD));

/// Preset name -> ordered pattern list
pub static PRESETS: Lazy<IndexMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut presets = IndexMap::new();
    presets.insert("apache", vec![APACHE_COMBINED, APACHE_COMMON]);
    presets.insert("s3", vec![S3_FULL, S3_LEGACY.as_str()]);
    presets.insert("clb", vec![CLB]);
    presets.insert("alb", vec![ALB_FULL.as_str(), ALB_LEGACY.as_str()]);
    presets.insert("nlb", vec![NLB]);
    presets
});

pub fn preset(name: &str) -> Option<&'static [&'static str]> {
    PRESETS.get(name).map(Vec::as_slice)
}

pub fn names() -> Vec<&'static str> {
    PRESETS.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{LineDecoder, RegexDecoder};

    #[test]
    fn test_every_preset_compiles() {
        for name in names() {
            let patterns = preset(name).unwrap();
            assert!(RegexDecoder::new(patterns).is_ok(), "preset {}", name);
        }
    }

    #[test]
    fn test_apache_combined_wins_over_common() {
        let decoder = RegexDecoder::new(preset("apache").unwrap()).unwrap();
        let line = r#"192.168.1.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08""#;
        let decoded = decoder.decode(line).unwrap();
        assert_eq!(decoded.get("remote_user"), Some("frank"));
        assert_eq!(decoded.get("status"), Some("200"));
        assert_eq!(decoded.get("user_agent"), Some("Mozilla/4.08"));
    }

    #[test]
    fn test_apache_common() {
        let decoder = RegexDecoder::new(preset("apache").unwrap()).unwrap();
        let line = r#"127.0.0.1 - - [10/Oct/2000:13:55:36 -0700] "POST /login HTTP/1.1" 302 -"#;
        let decoded = decoder.decode(line).unwrap();
        assert_eq!(decoded.len(), 9);
        assert_eq!(decoded.get("method"), Some("POST"));
        assert_eq!(decoded.get("size"), Some("-"));
    }

    #[test]
    fn test_clb_line() {
        let decoder = RegexDecoder::new(preset("clb").unwrap()).unwrap();
        let line = r#"2015-05-13T23:39:43.945958Z my-loadbalancer 192.168.131.39:2817 10.0.0.1:80 0.000086 0.001048 0.001337 200 200 0 57 "GET https://www.example.com:443/ HTTP/1.1" "curl/7.38.0" DHE-RSA-AES128-SHA TLSv1.2"#;
        let decoded = decoder.decode(line).unwrap();
        assert_eq!(decoded.get("elb"), Some("my-loadbalancer"));
        assert_eq!(decoded.get("protocol"), Some("HTTP/1.1"));
        assert_eq!(decoded.get("ssl_protocol"), Some("TLSv1.2"));
    }
}
