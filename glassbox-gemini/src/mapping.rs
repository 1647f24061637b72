//! Request/response mapping between internal types and the Generative
//! Language API JSON format.
//!
//! Reference: <https://ai.google.dev/api/generate-content>

use serde_json::{Value, json};
use uuid::Uuid;

use glassbox_types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, ProviderError, Role, StopReason,
    TokenUsage,
};

/// Build the `generateContent` request body.
pub(crate) fn to_api_request(request: &CompletionRequest) -> Value {
    let mut system_text = request.system.clone().unwrap_or_default();
    let mut contents = Vec::new();

    for message in &request.messages {
        // Gemini has no system role in `contents`; system messages fold
        // into the systemInstruction.
        if message.role == Role::System {
            if !system_text.is_empty() {
                system_text.push('\n');
            }
            system_text.push_str(&message.text());
            continue;
        }

        let role = match message.role {
            Role::Assistant => "model",
            _ => "user",
        };
        let parts: Vec<Value> = message.content.iter().filter_map(block_to_part).collect();
        if parts.is_empty() {
            continue;
        }
        contents.push(json!({ "role": role, "parts": parts }));
    }

    let mut body = json!({ "contents": contents });

    if !system_text.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": system_text }] });
    }

    if !request.tools.is_empty() {
        let declarations: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": sanitize_schema(tool.input_schema.clone()),
                })
            })
            .collect();
        body["tools"] = json!([{ "functionDeclarations": declarations }]);
    }

    let mut generation_config = serde_json::Map::new();
    if let Some(max_tokens) = request.max_tokens {
        generation_config.insert("maxOutputTokens".into(), json!(max_tokens));
    }
    if let Some(temperature) = request.temperature {
        generation_config.insert("temperature".into(), json!(temperature));
    }
    if !generation_config.is_empty() {
        body["generationConfig"] = Value::Object(generation_config);
    }

    body
}

fn block_to_part(block: &ContentBlock) -> Option<Value> {
    match block {
        ContentBlock::Text { text } => Some(json!({ "text": text })),
        // Thinking content is never echoed back to the model.
        ContentBlock::Thinking { .. } => None,
        ContentBlock::ToolUse { name, input, .. } => Some(json!({
            "functionCall": { "name": name, "args": input }
        })),
        ContentBlock::ToolResult { name, content, is_error, .. } => {
            let response = if *is_error {
                json!({ "error": content })
            } else {
                json!({ "result": content })
            };
            Some(json!({
                "functionResponse": { "name": name, "response": response }
            }))
        }
    }
}

/// Strip schemars metadata keys Gemini's schema validator rejects.
fn sanitize_schema(mut schema: Value) -> Value {
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.remove("definitions");
    }
    schema
}

/// Map one response part to a content block. Unknown part shapes map to
/// `None` and are skipped, not fatal.
pub(crate) fn part_to_block(part: &Value) -> Option<ContentBlock> {
    if let Some(text) = part["text"].as_str() {
        if part["thought"].as_bool().unwrap_or(false) {
            return Some(ContentBlock::Thinking {
                thinking: text.to_string(),
            });
        }
        return Some(ContentBlock::Text {
            text: text.to_string(),
        });
    }
    if part["functionCall"].is_object() {
        let name = part["functionCall"]["name"].as_str().unwrap_or("").to_string();
        let input = part["functionCall"]
            .get("args")
            .cloned()
            .unwrap_or_else(|| json!({}));
        return Some(ContentBlock::ToolUse {
            id: synth_call_id(),
            name,
            input,
        });
    }
    None
}

/// Gemini does not assign tool-call ids; synthesize one per call.
pub(crate) fn synth_call_id() -> String {
    format!("call_{}", Uuid::new_v4())
}

/// Extract token usage from a response chunk, if present.
pub(crate) fn usage_from_json(json: &Value) -> Option<TokenUsage> {
    let metadata = json.get("usageMetadata")?;
    Some(TokenUsage {
        input_tokens: metadata["promptTokenCount"].as_u64().unwrap_or(0),
        output_tokens: metadata["candidatesTokenCount"].as_u64().unwrap_or(0),
    })
}

/// Map a full (non-streaming) `generateContent` response.
pub(crate) fn from_api_response(json: &Value) -> Result<CompletionResponse, ProviderError> {
    let candidate = json["candidates"]
        .get(0)
        .ok_or_else(|| ProviderError::InvalidResponse("response has no candidates".into()))?;

    let content: Vec<ContentBlock> = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(part_to_block).collect())
        .unwrap_or_default();

    let has_tool_use = content
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolUse { .. }));
    let stop_reason = if has_tool_use {
        StopReason::ToolUse
    } else {
        match candidate["finishReason"].as_str() {
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        }
    };

    Ok(CompletionResponse {
        message: Message {
            role: Role::Assistant,
            content,
        },
        stop_reason,
        usage: usage_from_json(json).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassbox_types::ToolDefinition;

    fn request(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: None,
            messages,
            system: Some("You are a portfolio assistant.".into()),
            tools: vec![],
            max_tokens: Some(1024),
            temperature: None,
        }
    }

    #[test]
    fn maps_roles_and_system_instruction() {
        let body = to_api_request(&request(vec![
            Message::user("hi"),
            Message {
                role: Role::Assistant,
                content: vec![ContentBlock::Text { text: "hello".into() }],
            },
        ]));

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a portfolio assistant."
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn maps_tool_results_to_function_responses() {
        let body = to_api_request(&request(vec![Message {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: "call_1".into(),
                name: "get_skills".into(),
                content: "Rust".into(),
                is_error: false,
            }],
        }]));

        let part = &body["contents"][0]["parts"][0];
        assert_eq!(part["functionResponse"]["name"], "get_skills");
        assert_eq!(part["functionResponse"]["response"]["result"], "Rust");
    }

    #[test]
    fn maps_tool_definitions_to_function_declarations() {
        let mut req = request(vec![Message::user("hi")]);
        req.tools = vec![ToolDefinition {
            name: "find_symbol".into(),
            description: "Find a symbol".into(),
            input_schema: json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "title": "FindSymbolArgs",
                "type": "object",
                "properties": { "symbol_name": { "type": "string" } }
            }),
        }];
        let body = to_api_request(&req);

        let declaration = &body["tools"][0]["functionDeclarations"][0];
        assert_eq!(declaration["name"], "find_symbol");
        assert!(declaration["parameters"].get("$schema").is_none());
        assert!(declaration["parameters"].get("title").is_none());
        assert_eq!(
            declaration["parameters"]["properties"]["symbol_name"]["type"],
            "string"
        );
    }

    #[test]
    fn parses_text_response() {
        let response = from_api_response(&json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello!" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 7, "candidatesTokenCount": 3 }
        }))
        .unwrap();

        assert_eq!(response.message.text(), "Hello!");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.input_tokens, 7);
        assert_eq!(response.usage.output_tokens, 3);
    }

    #[test]
    fn parses_function_call_with_synthesized_id() {
        let response = from_api_response(&json!({
            "candidates": [{
                "content": { "parts": [{
                    "functionCall": { "name": "get_projects", "args": {} }
                }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        let ContentBlock::ToolUse { id, name, .. } = &response.message.content[0] else {
            panic!("expected tool use block");
        };
        assert_eq!(name, "get_projects");
        assert!(id.starts_with("call_"));
    }

    #[test]
    fn thought_parts_become_thinking_blocks() {
        let block = part_to_block(&json!({ "text": "pondering", "thought": true })).unwrap();
        assert_eq!(block, ContentBlock::Thinking { thinking: "pondering".into() });
    }

    #[test]
    fn unknown_parts_are_skipped() {
        assert!(part_to_block(&json!({ "inlineData": { "mimeType": "image/png" } })).is_none());
    }

    #[test]
    fn empty_candidates_is_invalid_response() {
        let err = from_api_response(&json!({ "candidates": [] })).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
