use tabled::builder::Builder;
use tabled::settings::Style as TableStyle;
use tabled::Table;

use crate::analysis::DatasetCounters;

/// Unguarded: a zero denominator yields a non-finite value.
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator as f64
}

pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

pub fn round(value: f64) -> String {
    format!("{:.2}", value)
}

fn build_table(
    header: &str,
    column_label: impl Fn(&DatasetCounters) -> String,
    rows: Vec<(&str, Vec<String>)>,
    datasets: &[DatasetCounters],
) -> Table {
    let mut builder = Builder::default();

    let mut header_row = vec![header.to_string()];
    header_row.extend(datasets.iter().map(column_label));
    builder.push_record(header_row);

    for (label, values) in rows {
        let mut row = vec![label.to_string()];
        row.extend(values);
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(TableStyle::ascii());
    table
}

pub fn general_table(datasets: &[DatasetCounters]) -> Table {
    build_table(
        "Metric",
        |d| format!("Value ({})", d.title),
        vec![
            ("Plugins Found", datasets.iter().map(|d| d.total_plugins.to_string()).collect()),
            (
                "Plugins With Rules Found",
                datasets.iter().map(|d| d.plugins_with_some_rules.to_string()).collect(),
            ),
            (
                "Average Rules Per Plugin",
                datasets
                    .iter()
                    .map(|d| round(ratio(d.total_rules, d.plugins_with_some_rules)))
                    .collect(),
            ),
        ],
        datasets,
    )
}

pub fn rule_type_table(datasets: &[DatasetCounters]) -> Table {
    build_table(
        "Rule Type",
        |d| format!("% ({})", d.title),
        vec![
            (
                "Object Rule",
                datasets
                    .iter()
                    .map(|d| round(percentage(d.rule_type_object, d.total_rules)))
                    .collect(),
            ),
            (
                "Function Rule",
                datasets
                    .iter()
                    .map(|d| round(percentage(d.rule_type_function, d.total_rules)))
                    .collect(),
            ),
            (
                "Unknown",
                datasets
                    .iter()
                    .map(|d| round(d.rule_type_unknown() as f64 / d.total_rules as f64 * 100.0))
                    .collect(),
            ),
        ],
        datasets,
    )
}

pub fn options_table(datasets: &[DatasetCounters]) -> Table {
    build_table(
        "Metric",
        |d| format!("% ({})", d.title),
        vec![
            (
                "Rules With Options",
                datasets
                    .iter()
                    .map(|d| round(percentage(d.rule_mentions_options, d.total_rules)))
                    .collect(),
            ),
            (
                "Rules With Options But Missing Schema, Out of Total Rules",
                datasets
                    .iter()
                    .map(|d| {
                        round(percentage(d.rule_mentions_options_but_not_schema, d.total_rules))
                    })
                    .collect(),
            ),
            (
                "Rules With Options But Missing Schema, Out of Rules With Options",
                datasets
                    .iter()
                    .map(|d| {
                        round(percentage(
                            d.rule_mentions_options_but_not_schema,
                            d.rule_mentions_options,
                        ))
                    })
                    .collect(),
            ),
        ],
        datasets,
    )
}

pub fn render_report(datasets: &[DatasetCounters]) -> String {
    format!(
        "{}\n{}\n{}\n",
        general_table(datasets),
        rule_type_table(datasets),
        options_table(datasets)
    )
}

pub fn print_report(datasets: &[DatasetCounters]) {
    println!("{}", render_report(datasets));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DatasetCounters {
        DatasetCounters {
            title: "Top 100 Plugins".to_string(),
            total_plugins: 5,
            plugins_with_some_rules: 3,
            total_rules: 3,
            rule_mentions_options: 2,
            rule_mentions_options_but_not_schema: 1,
            rule_type_function: 1,
            rule_type_object: 2,
        }
    }

    #[test]
    fn test_rounding_two_decimals() {
        assert_eq!(round(ratio(1, 3)), "0.33");
        assert_eq!(round(ratio(2, 3)), "0.67");
        assert_eq!(round(percentage(1, 3)), "33.33");
        assert_eq!(round(ratio(6, 2)), "3.00");
    }

    #[test]
    fn test_division_by_zero_is_not_finite() {
        assert!(ratio(0, 0).is_nan());
        assert!(ratio(4, 0).is_infinite());
        assert_eq!(round(ratio(0, 0)), "NaN");
    }

    #[test]
    fn test_report_contains_rows_and_columns() {
        let mut other = sample();
        other.title = "Top 1000 Plugins".to_string();
        let rendered = render_report(&[sample(), other]);

        assert!(rendered.contains("Value (Top 100 Plugins)"));
        assert!(rendered.contains("% (Top 1000 Plugins)"));
        assert!(rendered.contains("Average Rules Per Plugin"));
        assert!(rendered.contains("Function Rule"));
        assert!(rendered.contains("66.67"));
        assert!(rendered.contains("33.33"));
        assert!(rendered.contains("50.00"));
        assert!(
            rendered.contains("Rules With Options But Missing Schema, Out of Rules With Options")
        );
    }

    #[test]
    fn test_unknown_can_be_negative_when_categories_overlap() {
        let mut data = sample();
        data.rule_type_function = 2;
        data.rule_type_object = 2;
        let rendered = rule_type_table(&[data]).to_string();
        assert!(rendered.contains("-33.33"));
    }
}
