#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Escape user-supplied text before splicing it into a template.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Unix seconds to a display timestamp.
pub fn format_ts(ts: i64) -> String {
    let format = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]");
    time::OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|t| t.format(format).ok())
        .unwrap_or_default()
}

/// Listing bodies are written in markdown.
pub fn markdown(src: &str) -> String {
    let escaped = escape(src);
    let parser = pulldown_cmark::Parser::new(&escaped);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn markdown_renders_emphasis() {
        assert!(markdown("a *red* car").contains("<em>red</em>"));
    }

    #[test]
    fn markdown_does_not_pass_raw_html() {
        assert!(!markdown("<script>alert(1)</script>").contains("<script>"));
    }

    #[test]
    fn markdown_keeps_escaped_entities_intact() {
        let html = markdown("Fiat & *Lada*, <2000$");
        assert!(html.contains("&amp;"));
        assert!(html.contains("&lt;2000$"));
        assert!(html.contains("<em>Lada</em>"));
    }
}
