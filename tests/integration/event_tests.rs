use qq_portrait::llm::gemini::extract_gemini_text;
use qq_portrait::llm::openai::extract_completion_text;
use qq_portrait::onebot::events::parse_group_message;
use serde_json::json;

#[test]
fn test_parse_group_message_event() {
    let raw = json!({
        "time": 1700000000,
        "self_id": 10000,
        "post_type": "message",
        "message_type": "group",
        "sub_type": "normal",
        "message_id": 555,
        "group_id": 123456,
        "user_id": 42,
        "message": [
            { "type": "at", "data": { "qq": 10000 } },
            { "type": "text", "data": { "text": " 画像 " } },
            { "type": "at", "data": { "qq": "all" } },
            { "type": "at", "data": { "qq": "77" } }
        ],
        "raw_message": "[CQ:at,qq=10000] 画像 [CQ:at,qq=all][CQ:at,qq=77]",
        "sender": { "user_id": 42, "nickname": "nick", "card": "" }
    })
    .to_string();

    let event = parse_group_message(&raw)
        .expect("event should decode")
        .expect("group message expected");

    assert_eq!(event.group_id, 123456);
    assert_eq!(event.sender_id(), "42");
    assert_eq!(event.message_str(), "画像");
    assert_eq!(event.first_mention().as_deref(), Some("77"));
}

#[test]
fn test_non_group_events_are_skipped() {
    let private = json!({
        "self_id": 1, "post_type": "message", "message_type": "private",
        "user_id": 2, "message": []
    })
    .to_string();
    let heartbeat = json!({ "self_id": 1, "post_type": "meta_event", "meta_event_type": "heartbeat" })
        .to_string();
    let string_format = json!({
        "self_id": 1, "post_type": "message", "message_type": "group",
        "group_id": 3, "user_id": 2, "message": "画像"
    })
    .to_string();

    assert!(parse_group_message(&private).unwrap().is_none());
    assert!(parse_group_message(&heartbeat).unwrap().is_none());
    assert!(parse_group_message(&string_format).unwrap().is_none());
    assert!(parse_group_message("{not json").is_err());
}

#[test]
fn test_extract_provider_texts() {
    let gemini = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "第一部分" }, { "text": "第二部分\n" }] }
        }]
    });
    assert_eq!(extract_gemini_text(&gemini).as_deref(), Some("第一部分第二部分"));
    assert!(extract_gemini_text(&json!({ "candidates": [] })).is_none());

    let openai = json!({
        "choices": [{ "message": { "role": "assistant", "content": " 画像 " } }]
    });
    assert_eq!(extract_completion_text(&openai).as_deref(), Some("画像"));
    assert!(extract_completion_text(&json!({ "choices": [] })).is_none());
}
