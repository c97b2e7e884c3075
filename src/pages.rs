//! HTML pages: predictor form, result view, problem statement

use crate::error::AppError;
use crate::features::{DoseNumber, FeatureRow, Manufacturer, Route, Selection, Site};
use crate::inference::{RiskAssessment, RiskLevel};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }
nav a { margin-right: 1rem; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
label { display: block; font-weight: 600; margin-bottom: .25rem; }
select { width: 100%; padding: .4rem; }
button { margin-top: 1.25rem; padding: .6rem 1.4rem; background: #d93025; color: #fff; border: 0; border-radius: 4px; }
.banner { padding: .8rem 1rem; border-radius: 4px; margin: 1rem 0; }
.high { background: #fef3c7; }
.low { background: #dcfce7; }
.error { background: #fee2e2; }
.info { background: #e8f0fe; padding: .8rem 1rem; border-radius: 4px; }
.metric { font-size: 2rem; font-weight: 700; }
progress { width: 100%; }
table { border-collapse: collapse; }
td, th { border: 1px solid #d1d5db; padding: .25rem .6rem; text-align: left; }
"#;

/// Escape text for HTML element and attribute content
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Risk Predictor</a><a href="/problem-statement">Problem Statement</a></nav>
{body}
</body>
</html>"#,
        title = escape(title),
    )
}

fn select(name: &str, label: &str, options: &[String], selected: Option<&str>) -> String {
    let options: String = options
        .iter()
        .map(|opt| {
            let mark = if Some(opt.as_str()) == selected { " selected" } else { "" };
            format!(r#"<option value="{v}"{mark}>{v}</option>"#, v = escape(opt))
        })
        .collect();

    format!(
        r#"<div><label for="{name}">{label}</label><select id="{name}" name="{name}">{options}</select></div>"#
    )
}

fn labels<T: Copy>(items: &[T], label: impl Fn(T) -> &'static str) -> Vec<String> {
    items.iter().map(|i| label(*i).to_string()).collect()
}

/// Predictor form, optionally pre-filled with the previous submission
pub fn form(previous: Option<&Selection>) -> String {
    let doses: Vec<String> = DoseNumber::all().map(|d| d.to_string()).collect();
    let manufacturer = previous.map(|s| s.manufacturer.label());
    let dose = previous.map(|s| s.dose.to_string());
    let route = previous.map(|s| s.route.label());
    let site = previous.map(|s| s.site.label());

    format!(
        r#"<h1>COVID-19 Vaccine Adverse Event Risk Predictor</h1>
<p>This app predicts the probability of a serious adverse event following an mRNA COVID-19 vaccine.
Select the patient's details below to get a risk assessment.</p>
<hr>
<form method="post" action="/predict">
<div class="grid">
{manufacturer}
{dose}
{route}
{site}
</div>
<button type="submit">Predict Risk</button>
</form>"#,
        manufacturer = select("manufacturer", "Vaccine Manufacturer", &labels(&Manufacturer::ALL, Manufacturer::label), manufacturer),
        dose = select("dose", "Dose Number", &doses, dose.as_deref()),
        route = select("route", "Administration Route", &labels(&Route::ALL, Route::label), route),
        site = select("site", "Administration Site", &labels(&Site::ALL, Site::label), site),
    )
}

pub fn form_page() -> String {
    layout("Vaccine Adverse Event Predictor", &form(None))
}

fn feature_table(row: &FeatureRow) -> String {
    let header: String = row
        .columns()
        .iter()
        .map(|c| format!("<th>{}</th>", escape(&c.column)))
        .collect();
    let cells: String = row
        .columns()
        .iter()
        .map(|c| format!("<td>{}</td>", c.value))
        .collect();
    format!("<table><tr>{header}</tr><tr>{cells}</tr></table>")
}

/// Form plus the outcome of one prediction
pub fn result_page(selection: &Selection, assessment: &RiskAssessment, model_description: &str) -> String {
    let (class, verdict) = match assessment.risk_level {
        RiskLevel::High => ("high", "<strong>High Risk</strong> of a serious adverse event detected."),
        RiskLevel::Low => ("low", "<strong>Low Risk</strong> of a serious adverse event detected."),
    };

    let body = format!(
        r#"{form}
<h2>Prediction Result</h2>
<div class="banner {class}">{verdict}</div>
<div>Predicted Probability of Serious Event</div>
<div class="metric">{percentage}</div>
<progress max="100" value="{progress}"></progress>
<details>
<summary>Show Advanced Details</summary>
<p>The prediction is based on: {description}</p>
<p>Input Features Sent to Model:</p>
{table}
</details>"#,
        form = form(Some(selection)),
        percentage = assessment.display_percentage(),
        progress = assessment.progress(),
        description = escape(model_description),
        table = feature_table(&assessment.features),
    );

    layout("Vaccine Adverse Event Predictor", &body)
}

pub fn error_page(err: &AppError) -> String {
    let body = format!(
        r#"{form}
<div class="banner error">{message}</div>"#,
        form = form(None),
        message = escape(&err.message()),
    );
    layout("Vaccine Adverse Event Predictor", &body)
}

pub fn problem_statement_page() -> String {
    let body = r#"<h1>Project: COVID-19 Vaccine Adverse Event Risk Prediction</h1>
<h2>Predicting Adverse Events Following Receipt of mRNA Based COVID-19 Vaccines, 2021</h2>
<hr>
<h3>Project Aim</h3>
<p>This project aims to predict adverse events following the administration of mRNA-based
COVID-19 vaccines through supervised classification models. Utilizing anonymized patient
survey datasets, the goal is to develop risk models that predict the likelihood of vaccine
side effects using demographic, health, and prior reaction data as features.</p>
<h3>Key Tasks &amp; Methodology</h3>
<ul>
<li><strong>Data Cleaning &amp; Feature Engineering:</strong> handling missing or imbalanced data entries, which is common in real-world datasets.</li>
<li><strong>Model Implementation:</strong> classifiers such as logistic regression, <strong>random forests</strong>, or <strong>gradient boosting</strong>, focusing on calibrated probability outputs to aid in risk assessment.</li>
<li><strong>Model Evaluation:</strong> clinical utility is evaluated using <strong>confusion matrices</strong> and <strong>precision-recall curves</strong>.</li>
<li><strong>Ethical Considerations:</strong> careful and ethical handling of sensitive health data.</li>
</ul>
<h3>Desired Outcomes</h3>
<div class="info">The key outcome is to produce <strong>transparent predictors with actionable
interpretations</strong> that can be valuable for public health frameworks. The model should not only
be predictive but also explainable.</div>"#;

    layout("Problem Statement", body)
}
