use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AffirmationNote, Analyzer, MoodAnalysis};
use crate::config::{get_variable, get_variable_or};
use crate::errors::ClientError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const ANALYSIS_PROMPT: &str = "You are a warm, concise journaling companion. \
The user shares a short mood note with a self-reported energy and valence, each from 1 to 10. \
Reply with a JSON object with exactly these keys: \
\"reflection\" (two or three supportive sentences addressed to the user), \
\"energy\" and \"valence\" (your refined estimates as numbers from 0 to 1), \
\"suggestedGenres\" (up to three Spotify seed genres such as \"pop\", \"acoustic\", \"ambient\", \"hip-hop\").";

const AFFIRMATION_PROMPT: &str = "You write one short daily affirmation (a single sentence, no quotes) \
for someone based on excerpts of their recent mood notes. Be kind and specific, never clinical.";

/// Talks to an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiAnalyzer {
    client: Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl OpenAiAnalyzer {
    /// Creates a new instance. `base_url` is the API root, such as
    /// `https://api.openai.com/v1/`.
    pub fn new(client: Client, mut base_url: Url, api_key: String, model: String) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    pub fn from_env(client: Client) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&get_variable_or("OPENAI_BASE_URL", DEFAULT_BASE_URL))?;

        Ok(Self::new(
            client,
            base_url,
            get_variable("OPENAI_API_KEY"),
            get_variable_or("OPENAI_MODEL", DEFAULT_MODEL),
        ))
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        format: Option<ResponseFormat>,
    ) -> Result<String, ClientError> {
        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let request = ChatRequest {
            model: &self.model,
            messages,
            response_format: format,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();

            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClientError::InvalidResponse("completion has no content".to_owned()))
    }
}

impl Analyzer for OpenAiAnalyzer {
    fn analyze(
        &self,
        text: String,
        energy: i16,
        valence: i16,
    ) -> BoxFuture<Result<MoodAnalysis, ClientError>> {
        async move {
            let messages = vec![
                ChatMessage::system(ANALYSIS_PROMPT),
                ChatMessage::user(format!(
                    "Energy: {}/10\nValence: {}/10\nNote: {}",
                    energy, valence, text
                )),
            ];

            let content = self
                .complete(messages, Some(ResponseFormat::json_object()))
                .await?;

            parse_analysis(&content)
        }
        .boxed()
    }

    fn affirm(&self, notes: Vec<AffirmationNote>) -> BoxFuture<Result<String, ClientError>> {
        async move {
            let notes = serde_json::to_string(&notes)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

            let messages = vec![
                ChatMessage::system(AFFIRMATION_PROMPT),
                ChatMessage::user(format!("Recent notes: {}", notes)),
            ];

            let content = self.complete(messages, None).await?;
            let affirmation = content.trim();

            if affirmation.is_empty() {
                Err(ClientError::InvalidResponse("affirmation is empty".to_owned()))
            } else {
                Ok(affirmation.to_owned())
            }
        }
        .boxed()
    }
}

/// Reads the JSON object the model was asked to produce, clamping the
/// refined signals into [0, 1] and tidying the genre names.
pub(crate) fn parse_analysis(content: &str) -> Result<MoodAnalysis, ClientError> {
    let mut analysis: MoodAnalysis = serde_json::from_str(content.trim())
        .map_err(|e| ClientError::InvalidResponse(format!("unparsable analysis: {}", e)))?;

    analysis.energy = analysis.energy.max(0.0).min(1.0);
    analysis.valence = analysis.valence.max(0.0).min(1.0);
    analysis.suggested_genres = analysis
        .suggested_genres
        .iter()
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();

    Ok(analysis)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl ResponseFormat {
    fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};
    use warp::http::StatusCode;
    use warp::Filter;

    use super::*;

    type Requests = Arc<Mutex<Vec<(String, Value)>>>;

    /// Serves `body` with `status` for every completion request and
    /// records each request's authorization header and JSON body.
    fn serve_stub(status: StatusCode, body: Value) -> (OpenAiAnalyzer, Requests) {
        let requests: Requests = Arc::new(Mutex::new(vec![]));

        let route = {
            let requests = requests.clone();
            warp::path!("v1" / "chat" / "completions")
                .and(warp::post())
                .and(warp::header::<String>("authorization"))
                .and(warp::body::json::<Value>())
                .map(move |authorization: String, request: Value| {
                    requests.lock().unwrap().push((authorization, request));

                    warp::reply::with_status(warp::reply::json(&body), status)
                })
        };

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let analyzer = OpenAiAnalyzer::new(
            Client::new(),
            Url::parse(&format!("http://{}/v1", addr)).unwrap(),
            "test-key".to_owned(),
            "test-model".to_owned(),
        );

        (analyzer, requests)
    }

    fn completion(content: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn parses_and_clamps_analysis() {
        let analysis = parse_analysis(
            r#"{
                "reflection": "It sounds like the walk helped you reset.",
                "energy": 1.4,
                "valence": -0.2,
                "suggestedGenres": [" Acoustic ", "", "chill"]
            }"#,
        )
        .expect("parse analysis");

        assert_eq!(analysis.reflection, "It sounds like the walk helped you reset.");
        assert!((analysis.energy - 1.0).abs() < f64::EPSILON);
        assert!(analysis.valence.abs() < f64::EPSILON);
        assert_eq!(analysis.suggested_genres, vec!["acoustic", "chill"]);
    }

    #[test]
    fn genres_are_optional() {
        let analysis =
            parse_analysis(r#"{"reflection": "Rest well.", "energy": 0.2, "valence": 0.6}"#)
                .expect("parse analysis");

        assert!(analysis.suggested_genres.is_empty());
    }

    #[test]
    fn rejects_prose() {
        match parse_analysis("Sure! Here is your reflection.") {
            Err(ClientError::InvalidResponse(message)) => {
                assert!(message.starts_with("unparsable analysis"))
            }
            other => panic!("expected invalid response, got {:?}", other),
        }
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let analyzer = OpenAiAnalyzer::new(
            Client::new(),
            Url::parse("http://localhost:8080/v1").unwrap(),
            "key".to_owned(),
            DEFAULT_MODEL.to_owned(),
        );

        assert_eq!(
            analyzer.base_url.join("chat/completions").unwrap().as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn analysis_is_requested_as_json_object() {
        let (analyzer, requests) = serve_stub(
            StatusCode::OK,
            completion(
                r#"{"reflection": "That walk did you good.", "energy": 0.3, "valence": 0.9, "suggestedGenres": ["Chill"]}"#,
            ),
        );

        let analysis = analyzer
            .analyze("Long day, but the walk helped.".to_owned(), 4, 8)
            .await
            .expect("analyze");

        assert_eq!(analysis.reflection, "That walk did you good.");
        assert!((analysis.energy - 0.3).abs() < f64::EPSILON);
        assert_eq!(analysis.suggested_genres, vec!["chill"]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);

        let (authorization, request) = &requests[0];
        assert_eq!(authorization, "Bearer test-key");
        assert_eq!(request["model"], "test-model");
        assert_eq!(request["response_format"]["type"], "json_object");
        assert_eq!(request["messages"][0]["role"], "system");

        let prompt = request["messages"][1]["content"].as_str().unwrap_or_default();
        assert!(prompt.contains("Energy: 4/10"));
        assert!(prompt.contains("Valence: 8/10"));
        assert!(prompt.ends_with("Long day, but the walk helped."));
    }

    #[tokio::test]
    async fn affirmation_is_plain_text() {
        let (analyzer, requests) =
            serve_stub(StatusCode::OK, completion("  You showed up for yourself today.\n"));

        let affirmation = analyzer.affirm(vec![]).await.expect("affirm");

        assert_eq!(affirmation, "You showed up for yourself today.");
        assert!(requests.lock().unwrap()[0].1.get("response_format").is_none());
    }

    #[tokio::test]
    async fn error_status_becomes_api_error() {
        let (analyzer, _) = serve_stub(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": { "message": "model overloaded" } }),
        );

        match analyzer.affirm(vec![]).await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert!(message.contains("model overloaded"));
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }
}
