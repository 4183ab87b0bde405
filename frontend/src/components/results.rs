use shared::display::{
    Severity, bar_width, classification_tone, format_timestamp, optional_percent, percent,
};
use shared::{AnalysisResult, Prediction};
use yew::prelude::*;

pub fn render_results(result: &AnalysisResult, heatmap_url: Option<String>) -> Html {
    let classification = result.overall_classification.as_str();
    let tone = classification_tone(Some(classification).filter(|c| !c.is_empty()));
    let is_normal = tone == "tone-normal";

    html! {
        <div class="results-container">
            <div class={classes!("result-header", tone)}>
                <h2>
                    if is_normal {
                        <i class="fa-solid fa-circle-check"></i>
                    } else {
                        <i class="fa-solid fa-triangle-exclamation"></i>
                    }
                    { format!(" {}", classification) }
                </h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={bar_width(result.confidence_score.unwrap_or_default())}></div>
                    </div>
                    <div class="meter-value">{ optional_percent(result.confidence_score) }</div>
                </div>
                if let Some(processed_at) = &result.processed_at {
                    <p class="result-meta">{ format!("Analyzed {}", format_timestamp(processed_at)) }</p>
                }
            </div>

            <div class="result-body">
                <div class="detailed-results">
                    <h3>{"Detailed Analysis"}</h3>
                    if result.predictions.is_empty() {
                        <p class="no-results-message">{"No findings were reported for this scan."}</p>
                    } else {
                        <div class="result-bars">
                            { for result.predictions.iter().map(render_prediction) }
                        </div>
                    }
                </div>

                <div class="heatmap">
                    <h3>{"Attention Heatmap"}</h3>
                    {
                        match heatmap_url {
                            Some(url) => html! { <img src={url} alt="Model attention heatmap" /> },
                            None => html! {
                                <div class="heatmap-placeholder">
                                    <i class="fa-solid fa-image"></i>
                                    <p>{"Heatmap not available"}</p>
                                </div>
                            },
                        }
                    }
                </div>
            </div>

            <div class="clinical-notice">
                <i class="fa-solid fa-circle-info"></i>
                <p>
                    {"This analysis is intended to support, not replace, clinical judgement. \
                      Findings must be reviewed by a qualified professional."}
                </p>
            </div>
            if let Some(version) = &result.model_version {
                <p class="result-meta">{ format!("Model {}", version) }</p>
            }
        </div>
    }
}

fn render_prediction(prediction: &Prediction) -> Html {
    let severity = Severity::of(prediction.probability);
    html! {
        <div class="result-item">
            <div class="result-label">{ prediction.label.clone() }</div>
            <div class="result-bar-container">
                <div class={classes!("result-bar", severity.css_class())} style={bar_width(prediction.probability)}></div>
            </div>
            <div class="result-value">{ percent(prediction.probability) }</div>
            if let Some(description) = &prediction.description {
                <p class="result-description">{ description.clone() }</p>
            }
        </div>
    }
}
