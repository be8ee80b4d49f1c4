use crate::encode::TerminalQr;

fn header(qr: &TerminalQr) -> String {
    let preview: String = qr.contents.chars().take(40).collect();
    let ellipsis = if qr.contents.chars().count() > 40 { "..." } else { "" };
    format!("Contents: {}{}\n{}", preview, ellipsis, "=".repeat(50))
}

pub fn display_qr(qr: &TerminalQr) {
    println!("{}", header(qr));
    println!();
    println!("{}", qr.rendered);

    if !qr.fits {
        println!("(terminal too small, the code above may be cut off)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_contents_are_truncated_in_header() {
        let qr = TerminalQr {
            contents: "x".repeat(60),
            rendered: String::new(),
            fits: true,
        };
        let header = header(&qr);
        assert!(header.starts_with(&format!("Contents: {}...", "x".repeat(40))));

        let short = TerminalQr {
            contents: "short".to_string(),
            rendered: String::new(),
            fits: true,
        };
        assert!(header_line(&short).ends_with("short"));
    }

    fn header_line(qr: &TerminalQr) -> String {
        header(qr).lines().next().unwrap_or_default().to_string()
    }
}
