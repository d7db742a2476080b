use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

use crate::match_state::{PredictRequest, Team, CITIES, IPL_LOGO};
use crate::model::ModelInfo;
use crate::predictor::{PredictError, WinPredictor};

#[derive(Clone)]
pub struct AppState {
    pub predictor: WinPredictor,
    pub model_info: ModelInfo,
}

/// Build the Axum router for the prediction form.
pub fn router(state: AppState, logos_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/model", get(model_handler))
        .route("/api/predict", post(predict_handler))
        .nest_service("/logos", ServeDir::new(logos_dir))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the form page, tagging it with the loaded model's name.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let html = FORM_HTML.replace(
        r#"<body>"#,
        &format!(
            r#"<body data-model="{} v{}">"#,
            escape_attr(&state.model_info.name),
            escape_attr(&state.model_info.version)
        ),
    );
    Html(html)
}

#[derive(Debug, Serialize)]
struct TeamOption {
    name: &'static str,
    logo: &'static str,
}

#[derive(Debug, Serialize)]
struct FormOptions {
    teams: Vec<TeamOption>,
    cities: &'static [&'static str],
    ipl_logo: &'static str,
}

/// GET /api/options
async fn options_handler() -> Json<FormOptions> {
    Json(FormOptions {
        teams: Team::ALL
            .iter()
            .map(|t| TeamOption {
                name: t.name(),
                logo: t.logo(),
            })
            .collect(),
        cities: &CITIES,
        ipl_logo: IPL_LOGO,
    })
}

/// GET /api/model
async fn model_handler(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    Json(state.model_info.clone())
}

#[derive(Debug, Serialize)]
struct Problem {
    kind: &'static str,
    message: String,
}

fn problem(status: StatusCode, kind: &'static str, message: String) -> Response {
    (status, Json(Problem { kind, message })).into_response()
}

/// POST /api/predict
///
/// Bodies that are not a well-formed request get the same 400 problem shape
/// as out-of-domain values.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Malformed prediction request: {}", rejection.body_text());
            return problem(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text());
        }
    };
    match state.predictor.predict_request(&req) {
        Ok(forecast) => {
            info!(
                "Prediction: {} {}% v {} {}% (target {}, {} runs off {} balls)",
                forecast.batting.team,
                forecast.batting.percent,
                forecast.bowling.team,
                forecast.bowling.percent,
                req.target,
                forecast.features.runs_left,
                forecast.features.balls_left
            );
            (StatusCode::OK, Json(forecast)).into_response()
        }
        Err(PredictError::Validation(w)) => {
            warn!("Rejected match state: {}", w);
            problem(StatusCode::UNPROCESSABLE_ENTITY, "warning", w.to_string())
        }
        Err(PredictError::Input(e)) => {
            debug!("Invalid prediction input: {}", e);
            problem(StatusCode::BAD_REQUEST, "invalid_input", e.to_string())
        }
        Err(PredictError::Model(e)) => {
            error!("Prediction model failed: {:#}", e);
            problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                "model_error",
                "The prediction model could not score this match state.".into(),
            )
        }
    }
}

fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Embedded single-file form (HTML + CSS + JS)
const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Win Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --amber: #ff9800;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; display: grid; grid-template-columns: 280px 1fr; min-height: 100vh; }
  aside { background: var(--card); border-right: 1px solid var(--border); padding: 1.5rem; }
  aside h2 { font-size: 1.2rem; margin-bottom: 1rem; }
  aside p, aside li { color: var(--muted); font-size: .88rem; line-height: 1.5; }
  aside h3 { font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; margin: 1.2rem 0 .4rem; }
  aside ul { padding-left: 1.1rem; }
  aside hr { border: none; border-top: 1px solid var(--border); margin: 1.2rem 0; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.2rem; align-content: start; max-width: 860px; }
  header { display: flex; align-items: center; gap: 1rem; }
  header img { width: 60px; height: 60px; }
  header h1 { font-size: 1.6rem; font-weight: 700; }
  .row { display: grid; gap: 1rem; }
  .row.two { grid-template-columns: 1fr 1fr; }
  .row.three { grid-template-columns: 1fr 1fr 1fr; }
  @media (max-width: 768px) { body { grid-template-columns: 1fr; } .row.two, .row.three { grid-template-columns: 1fr; } }
  label { display: grid; gap: .35rem; font-size: .8rem; color: var(--muted); text-transform: uppercase; letter-spacing: .05em; }
  select, input { background: var(--card); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .55rem .7rem; font-size: .95rem; }
  select:focus, input:focus { outline: none; border-color: var(--accent); }
  button { justify-self: start; background: var(--accent); color: #fff; border: none; border-radius: 6px; padding: .65rem 1.3rem; font-size: .95rem; font-weight: 600; cursor: pointer; }
  button:disabled { opacity: .6; cursor: wait; }
  .notice { border-radius: 8px; padding: .8rem 1rem; font-size: .9rem; display: none; }
  .notice.warning { display: block; background: rgba(255,152,0,.15); border: 1px solid var(--amber); color: var(--amber); }
  .notice.error { display: block; background: rgba(255,79,106,.15); border: 1px solid var(--red); color: var(--red); }
  #result { display: none; }
  #result h2 { font-size: 1.2rem; margin-bottom: .8rem; }
  .side { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem; display: grid; gap: .6rem; justify-items: start; }
  .side img { width: 80px; height: 80px; }
  .side .pct { font-size: 1.05rem; font-weight: 700; padding: .5rem .8rem; border-radius: 6px; width: 100%; }
  .side.win .pct { background: rgba(0,200,150,.15); color: var(--green); }
  .side.loss .pct { background: rgba(255,79,106,.15); color: var(--red); }
  .features { color: var(--muted); font-size: .8rem; margin-top: .6rem; }
</style>
</head>
<body>
<aside>
  <h2>🏏 IPL Win Predictor</h2>
  <p>Predict the winning probability of an IPL team based on the current match scenario.
  Use this tool to get real-time insights into the game using an ML model trained on past IPL data.</p>
  <hr>
  <h3>Features</h3>
  <ul>
    <li>Batting and bowling teams</li>
    <li>Match city</li>
    <li>Target runs</li>
    <li>Current score</li>
    <li>Overs completed</li>
    <li>Wickets lost</li>
  </ul>
  <hr>
  <h3>Output</h3>
  <ul><li>Winning probability for both teams in percentage</li></ul>
  <p class="features" id="model-name"></p>
</aside>

<main>
  <header>
    <img id="ipl-logo" alt="IPL" onerror="this.style.visibility='hidden'">
    <h1>🏆 IPL Win Predictor</h1>
  </header>

  <form id="predict-form" class="row" onsubmit="predict(event)">
    <div class="row two">
      <label>Select the batting team <select id="batting_team"></select></label>
      <label>Select the bowling team <select id="bowling_team"></select></label>
    </div>
    <label>Select host city <select id="city"></select></label>
    <label>Target Score <input id="target" type="number" min="1" step="1" value="1"></label>
    <div class="row three">
      <label>Current Score <input id="score" type="number" min="0" step="1" value="0"></label>
      <label>Overs Completed <input id="overs" type="number" min="0.1" max="20" step="0.1" value="0.1"></label>
      <label>Wickets Out <input id="wickets" type="number" min="0" max="10" step="1" value="0"></label>
    </div>
    <button type="submit" id="predict-btn">Predict Probability</button>
  </form>

  <div class="notice" id="notice"></div>

  <section id="result">
    <h2>📊 Winning Probability</h2>
    <div class="row two">
      <div class="side win">
        <img id="batting-logo" alt="" onerror="this.style.visibility='hidden'">
        <div class="pct" id="batting-pct"></div>
      </div>
      <div class="side loss">
        <img id="bowling-logo" alt="" onerror="this.style.visibility='hidden'">
        <div class="pct" id="bowling-pct"></div>
      </div>
    </div>
    <p class="features" id="features"></p>
  </section>
</main>

<script>
const $ = id => document.getElementById(id);

function fillSelect(el, values) {
  el.innerHTML = values.map(v => `<option value="${v}">${v}</option>`).join('');
}

async function loadOptions() {
  const r = await fetch('/api/options');
  if (!r.ok) return;
  const o = await r.json();
  const teams = o.teams.map(t => t.name);
  fillSelect($('batting_team'), teams);
  fillSelect($('bowling_team'), teams);
  fillSelect($('city'), o.cities);
  $('ipl-logo').src = '/' + o.ipl_logo;
}

function showNotice(kind, message) {
  const n = $('notice');
  n.className = 'notice ' + kind;
  n.textContent = (kind === 'warning' ? '⚠️ ' : '') + message;
}

function clearNotice() {
  $('notice').className = 'notice';
  $('notice').textContent = '';
}

function render(f) {
  $('batting-logo').src = '/' + f.batting.logo;
  $('bowling-logo').src = '/' + f.bowling.logo;
  $('batting-pct').textContent = `${f.batting.team}: ${f.batting.percent}%`;
  $('bowling-pct').textContent = `${f.bowling.team}: ${f.bowling.percent}%`;
  const x = f.features;
  $('features').textContent =
    `${x.runs_left} runs needed off ${x.balls_left} balls, ${x.wickets_left} wickets left · ` +
    `CRR ${x.crr.toFixed(2)} · RRR ${x.rrr.toFixed(2)}`;
  $('result').style.display = 'block';
}

async function predict(ev) {
  ev.preventDefault();
  clearNotice();
  $('result').style.display = 'none';
  const body = {
    batting_team: $('batting_team').value,
    bowling_team: $('bowling_team').value,
    city: $('city').value,
    target: Number($('target').value),
    score: Number($('score').value),
    overs: Number($('overs').value),
    wickets: Number($('wickets').value),
  };
  const btn = $('predict-btn');
  btn.disabled = true;
  try {
    const r = await fetch('/api/predict', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });
    let payload = null;
    try { payload = await r.json(); } catch (_) { payload = null; }
    if (r.ok && payload) {
      render(payload);
    } else if (payload && payload.kind === 'warning') {
      showNotice('warning', payload.message);
    } else if (payload && payload.message) {
      showNotice('error', payload.message);
    } else {
      showNotice('error', 'Please check the inputs and try again.');
    }
  } catch (e) {
    showNotice('error', 'Could not reach the predictor.');
  } finally {
    btn.disabled = false;
  }
}

document.addEventListener('DOMContentLoaded', () => {
  $('model-name').textContent = document.body.dataset.model ? 'Model: ' + document.body.dataset.model : '';
  loadOptions();
});
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::tests::{request, FixedModel};
    use axum::body::{to_bytes, Body};
    use axum::extract::FromRequest;
    use axum::http::{header, Request};
    use std::sync::atomic::Ordering;

    fn state(win: f64) -> (Arc<AppState>, Arc<FixedModel>) {
        let model = Arc::new(FixedModel::new(win));
        let info = crate::model::WinModel::info(model.as_ref());
        let state = AppState {
            predictor: WinPredictor::new(model.clone()),
            model_info: info,
        };
        (Arc::new(state), model)
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn predict_returns_attributed_percentages() {
        let (state, model) = state(0.8);
        let resp = predict_handler(State(state), Ok(Json(request()))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["batting"]["team"], "Punjab Kings");
        assert_eq!(body["batting"]["percent"], 80);
        assert_eq!(body["bowling"]["team"], "Lucknow Super Giants");
        assert_eq!(body["bowling"]["percent"], 20);
        assert_eq!(body["features"]["balls_left"], 48);
        assert_eq!(body["input"]["city"], "Mohali");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_team_is_a_warning() {
        let (state, model) = state(0.8);
        let mut req = request();
        req.bowling_team = req.batting_team.clone();
        let resp = predict_handler(State(state), Ok(Json(req))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(resp).await;
        assert_eq!(body["kind"], "warning");
        assert_eq!(body["message"], "Batting and Bowling team must be different.");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_team_is_bad_input() {
        let (state, _) = state(0.8);
        let mut req = request();
        req.batting_team = "Pune Warriors".into();
        let resp = predict_handler(State(state), Ok(Json(req))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["kind"], "invalid_input");
    }

    async fn extract(content_type: &str, body: &'static str) -> Result<Json<PredictRequest>, JsonRejection> {
        let req = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        Json::<PredictRequest>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_input() {
        let negative_wickets = r#"{"batting_team": "Punjab Kings", "bowling_team": "Lucknow Super Giants",
            "city": "Mohali", "target": 180, "score": 100, "overs": 12.0, "wickets": -1}"#;
        let cases = [
            ("application/json", negative_wickets),
            ("application/json", r#"{"batting_team": "Punjab Kings""#),
            ("text/plain", r#"{}"#),
        ];
        for (content_type, body) in cases {
            let (state, model) = state(0.8);
            let payload = extract(content_type, body).await;
            assert!(payload.is_err(), "{} should be rejected", body);

            let resp = predict_handler(State(state), payload).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = json_body(resp).await;
            assert_eq!(body["kind"], "invalid_input");
            assert!(!body["message"].as_str().unwrap().is_empty());
            assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn well_formed_body_is_scored() {
        let (state, _) = state(0.8);
        let body = r#"{"batting_team": "Punjab Kings", "bowling_team": "Lucknow Super Giants",
            "city": "Mohali", "target": 180, "score": 100, "overs": 12.3, "wickets": 3}"#;
        let resp = predict_handler(State(state), extract("application/json", body).await).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["features"]["balls_left"], 46);
    }

    #[tokio::test]
    async fn options_list_sorted_teams_and_cities() {
        let Json(options) = options_handler().await;
        assert_eq!(options.teams.len(), 10);
        assert_eq!(options.teams[0].name, "Chennai Super Kings");
        assert_eq!(options.cities.len(), 33);
        assert_eq!(options.ipl_logo, "logos/ipl.svg");
    }

    #[tokio::test]
    async fn index_carries_model_name() {
        let (state, _) = state(0.5);
        let resp = index_handler(State(state)).await.into_response();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"<body data-model="fixed vtest">"#));
        assert!(html.contains("Predict Probability"));
    }

    #[test]
    fn attribute_escaping() {
        assert_eq!(escape_attr(r#"a"<b>&"#), "a&quot;&lt;b&gt;&amp;");
    }
}
