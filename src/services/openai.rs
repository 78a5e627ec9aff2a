use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use futures::stream::{self, Stream, StreamExt};

use super::{ChunkStream, ContentBackend};
use crate::error::GenerateError;
use crate::types::{ContentType, GenerationMode, GenerationRequest};

pub const SYSTEM_PROMPT: &str = "You are an expert content writer.";
pub const TEMPERATURE: f32 = 0.7;

/// Streams chat completions from an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, model: &str, api_base: Option<&str>) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            config = config.with_api_base(base);
        }
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    pub fn build_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<CreateChatCompletionRequest, GenerateError> {
        let build_err = |e: async_openai::error::OpenAIError| GenerateError::Build(e.to_string());

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(build_err)?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt(request))
                    .build()
                    .map_err(build_err)?
                    .into(),
            ])
            .temperature(TEMPERATURE)
            // compatible servers behind OPENAI_BASE_URL only read max_tokens
            .max_tokens(request.length.max_tokens())
            .stream(true)
            .build()
            .map_err(build_err)
    }
}

pub fn user_prompt(request: &GenerationRequest) -> String {
    let GenerationRequest {
        content_type,
        prompt,
        tone,
        length,
    } = request;
    match content_type {
        ContentType::Blog => format!(
            "Write a {length} {tone} blog post about: {prompt}\n\
             Make it engaging, informative, and well-structured."
        ),
        ContentType::Social => format!(
            "Create {length} {tone} social media content about: {prompt}\n\
             Include hashtags and make it engaging."
        ),
        ContentType::Email => format!(
            "Write a {length} {tone} email about: {prompt}\n\
             Include a subject line and professional closing."
        ),
        ContentType::Product => format!(
            "Write a {length} {tone} product description for: {prompt}\n\
             Highlight benefits and USPs."
        ),
    }
}

/// Drops empty deltas and converts upstream errors. Order is preserved and
/// nothing is batched.
pub fn text_deltas<S, E>(upstream: S) -> impl Stream<Item = Result<String, GenerateError>>
where
    S: Stream<Item = Result<Option<String>, E>>,
    E: Into<GenerateError>,
{
    upstream.filter_map(|item| async move {
        match item {
            Ok(Some(text)) if !text.is_empty() => Some(Ok(text)),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        }
    })
}

/// Waits for the first delta so a failing upstream surfaces as an error
/// before the response is committed, then replays it in front of the rest.
pub async fn prime(mut deltas: ChunkStream) -> Result<ChunkStream, GenerateError> {
    match deltas.next().await {
        Some(Ok(first)) => Ok(stream::once(async move { Ok(first) }).chain(deltas).boxed()),
        Some(Err(e)) => Err(e),
        None => Ok(stream::empty().boxed()),
    }
}

#[async_trait::async_trait]
impl ContentBackend for OpenAiBackend {
    fn mode(&self) -> GenerationMode {
        GenerationMode::Live
    }

    async fn open(&self, request: &GenerationRequest) -> Result<ChunkStream, GenerateError> {
        let chat_request = self.build_request(request)?;
        log::info!(
            "Requesting {} completion from {} (max tokens {})",
            request.content_type,
            self.model,
            request.length.max_tokens()
        );

        let upstream = self.client.chat().create_stream(chat_request).await?;
        let deltas = text_deltas(upstream.map(|item| {
            item.map(|response| {
                response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
            })
        }));
        prime(deltas.boxed()).await
    }
}
