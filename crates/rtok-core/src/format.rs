//! Compact token formatting (`1.9k`, `507k`, `1.2M`)
//!
//! Values are truncated, never rounded up, so a status line never
//! overstates how much text is in a repository.

pub fn format_tokens(count: usize) -> String {
    if count < 1_000 {
        count.to_string()
    } else if count < 100_000 {
        let tenths = count / 100;
        format!("{}.{}k", tenths / 10, tenths % 10)
    } else if count < 1_000_000 {
        format!("{}k", count / 1_000)
    } else {
        let tenths = count / 100_000;
        format!("{}.{}M", tenths / 10, tenths % 10)
    }
}

/// Integer with `,` thousands separators
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
