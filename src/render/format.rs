//! Number and table formatting for the presentation layer.
//!
//! Conventions: percentages to one decimal, p-values to four decimals,
//! currency rounded to whole dollars with thousands separators.

/// `0.106` -> `"10.6%"`.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// `0.00012` -> `"0.0001"`.
pub fn p_value(p: f64) -> String {
    format!("{:.4}", p)
}

/// `2108638.05` -> `"$2,108,638"`.
pub fn currency(amount: f64) -> String {
    format!("${}", group_thousands(amount.round() as i64))
}

/// `200822672.0` -> `"200,822,672"`.
pub fn count(value: f64) -> String {
    group_thousands(value.round() as i64)
}

/// `200822672.0` -> `"200.8M"`. Values under a thousand print as-is.
pub fn count_short(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        group_thousands(value.round() as i64)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// A preformatted table: headers plus string cells, ready for any surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Optional rebind key: tables whose cells depend on the sliders carry
    /// one so the page can rebuild them client-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

impl Table {
    pub fn new(title: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == headers.len()));
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
            bind: None,
        }
    }

    pub fn bound(mut self, bind: &str) -> Self {
        self.bind = Some(bind.into());
        self
    }

    /// Render as a markdown table (used for text surfaces and tests).
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("| {} |\n", self.headers.join(" | ")));
        out.push_str(&format!(
            "|{}\n",
            self.headers.iter().map(|_| "---|").collect::<String>()
        ));
        for row in &self.rows {
            out.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_one_decimal() {
        assert_eq!(percent(0.106), "10.6%");
        assert_eq!(percent(1.0), "100.0%");
        assert_eq!(percent(0.0), "0.0%");
    }

    #[test]
    fn p_value_four_decimals() {
        assert_eq!(p_value(0.0001), "0.0001");
        assert_eq!(p_value(0.5702), "0.5702");
        assert_eq!(p_value(0.0), "0.0000");
    }

    #[test]
    fn currency_with_separators() {
        assert_eq!(currency(2_108_638.05), "$2,108,638");
        assert_eq!(currency(70_288.0), "$70,288");
        assert_eq!(currency(0.4), "$0");
    }

    #[test]
    fn counts_group_thousands() {
        assert_eq!(count(200_822_672.0), "200,822,672");
        assert_eq!(count(999.0), "999");
        assert_eq!(count(1_000.0), "1,000");
        assert_eq!(count(-1_234_567.0), "-1,234,567");
    }

    #[test]
    fn short_counts_abbreviate() {
        assert_eq!(count_short(200_822_672.0), "200.8M");
        assert_eq!(count_short(1_394_601.0), "1.4M");
        assert_eq!(count_short(46_486.7), "46.5K");
        assert_eq!(count_short(288.0), "288");
    }

    #[test]
    fn markdown_table_shape() {
        let t = Table::new(
            "Demo",
            &["Metric", "Value"],
            vec![vec!["Lift".into(), "10.6%".into()]],
        );
        let md = t.to_markdown();
        assert!(md.starts_with("| Metric | Value |\n"));
        assert!(md.contains("| Lift | 10.6% |"));
    }
}
