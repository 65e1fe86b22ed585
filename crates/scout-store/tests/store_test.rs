use scout_llm::{FunctionCall, Message, ToolCall};
use scout_store::{ConversationStore, MessageKind, StoreError};
use serde_json::{json, Map, Value};

fn store() -> (tempfile::TempDir, ConversationStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ConversationStore::new(dir.path().join("conversations")).unwrap();
    (dir, store)
}

fn metadata(model: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("model".to_string(), json!(model));
    map.insert("temperature".to_string(), json!(0.3));
    map
}

fn turn_messages(query: &str, answer: &str) -> Vec<Message> {
    vec![
        Message::system("You are a research assistant"),
        Message::human(query),
        Message::ai(answer),
    ]
}

#[test]
fn new_session_derives_name_and_records_one_exchange() {
    let (_dir, store) = store();

    let id = store
        .create_or_append(
            None,
            "What is Python?",
            "Python is a programming language.",
            &turn_messages("What is Python?", "Python is a programming language."),
            vec![],
            metadata("llama3.1:8b"),
        )
        .unwrap();

    let record = store.load(&id).unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.name, "what is python");
    assert_eq!(record.exchanges.len(), 1);
    assert_eq!(record.exchanges[0].query, "What is Python?");
    assert_eq!(record.metadata["model"], "llama3.1:8b");
}

#[test]
fn round_trip_preserves_exchanges_and_message_order() {
    let (_dir, store) = store();

    let messages = turn_messages("q", "a");
    let id = store
        .create_or_append(None, "q", "a", &messages, vec![], Map::new())
        .unwrap();

    let record = store.load(&id).unwrap();
    assert_eq!(record.messages.len(), 3);
    assert_eq!(record.messages[0].kind, MessageKind::System);
    assert_eq!(record.messages[1].kind, MessageKind::User);
    assert_eq!(record.messages[1].content, "q");
    assert_eq!(record.messages[2].kind, MessageKind::Assistant);
    assert_eq!(record.messages[2].content, "a");
}

#[test]
fn continuation_keeps_created_at_and_advances_last_updated() {
    let (_dir, store) = store();

    let id = store
        .create_or_append(
            None,
            "What is Python?",
            "A language.",
            &turn_messages("What is Python?", "A language."),
            vec![],
            Map::new(),
        )
        .unwrap();
    let first = store.load(&id).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));

    let id2 = store
        .create_or_append(
            Some(&id),
            "What about Java?",
            "Also a language.",
            &[Message::human("What about Java?"), Message::ai("Also a language.")],
            vec![],
            Map::new(),
        )
        .unwrap();

    assert_eq!(id, id2);
    let record = store.load(&id).unwrap();
    assert_eq!(record.exchanges.len(), 2);
    assert_eq!(record.exchanges[0].query, "What is Python?");
    assert_eq!(record.exchanges[1].query, "What about Java?");
    assert_eq!(record.created_at, first.created_at);
    assert!(record.last_updated > first.last_updated);
    // Name stays derived from the first query
    assert_eq!(record.name, "what is python");
}

#[test]
fn append_to_unknown_session_is_not_found() {
    let (_dir, store) = store();
    let err = store
        .create_or_append(Some("20990101_000000_000"), "q", "a", &[], vec![], Map::new())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn load_unknown_session_is_not_found() {
    let (_dir, store) = store();
    assert!(matches!(
        store.load("nope"),
        Err(StoreError::NotFound(id)) if id == "nope"
    ));
}

#[test]
fn delete_is_idempotent_false() {
    let (_dir, store) = store();
    let id = store
        .create_or_append(None, "q", "a", &[], vec![], Map::new())
        .unwrap();

    assert!(store.delete(&id).unwrap());
    assert!(!store.delete(&id).unwrap());
    assert!(matches!(store.load(&id), Err(StoreError::NotFound(_))));
}

#[test]
fn list_orders_by_last_updated_desc() {
    let (_dir, store) = store();

    let mut ids = Vec::new();
    for i in 0..3 {
        let query = format!("question {}", i);
        ids.push(
            store
                .create_or_append(None, &query, "answer", &[], vec![], Map::new())
                .unwrap(),
        );
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    // Touch the oldest so it becomes the most recent
    store
        .create_or_append(Some(&ids[0]), "followup", "answer", &[], vec![], Map::new())
        .unwrap();

    let summaries = store.list(10).unwrap();
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[0].id, ids[0]);
    for pair in summaries.windows(2) {
        assert!(pair[0].last_updated >= pair[1].last_updated);
    }

    assert_eq!(summaries[0].exchange_count, 2);
    assert_eq!(summaries[0].first_query, "question 0");

    let limited = store.list(2).unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn rapid_creation_yields_unique_ids() {
    let (_dir, store) = store();

    let mut ids = std::collections::HashSet::new();
    for _ in 0..20 {
        let id = store
            .create_or_append(None, "q", "a", &[], vec![], Map::new())
            .unwrap();
        assert!(ids.insert(id), "duplicate session id generated");
    }
}

#[test]
fn reload_drops_tool_results_but_keeps_order() {
    let (_dir, store) = store();

    let call = ToolCall {
        id: "call_1".to_string(),
        tool_type: "function".to_string(),
        function: FunctionCall {
            name: "web_search".to_string(),
            arguments: r#"{"query":"rust"}"#.to_string(),
        },
    };
    let messages = vec![
        Message::system("You are a research assistant"),
        Message::human("What is Rust?"),
        Message::ai_with_tools(None, vec![call]),
        Message::tool_result("call_1", r#"{"status":"success"}"#),
        Message::ai("Rust is a systems language."),
    ];

    let id = store
        .create_or_append(None, "What is Rust?", "Rust is a systems language.", &messages, vec![], Map::new())
        .unwrap();

    let record = store.load(&id).unwrap();
    // Persisted transcript keeps everything, including the tool round
    assert_eq!(record.messages.len(), 5);
    assert_eq!(record.messages[2].tool_calls.as_ref().unwrap()[0].name, "web_search");
    assert_eq!(record.messages[3].kind, MessageKind::Tool);

    // Reconstructed context drops the tool result, keeps surrounding order
    let context = store.context_messages(&record);
    assert_eq!(context.len(), 4);
    assert_eq!(context[0].role(), "system");
    assert_eq!(context[1].role(), "user");
    assert_eq!(context[2].role(), "assistant");
    assert_eq!(context[3].role(), "assistant");
    assert_eq!(context[3].text(), Some("Rust is a systems language."));
    // Tool-call descriptors are not replayed into the live context
    assert!(context[2].tool_calls().is_none());
}

#[test]
fn append_preserves_unknown_metadata_keys() {
    let (_dir, store) = store();

    let mut initial = metadata("llama3.1:8b");
    initial.insert("custom_tag".to_string(), json!("keep-me"));

    let id = store
        .create_or_append(None, "q", "a", &[], vec![], initial)
        .unwrap();

    let mut update = Map::new();
    update.insert("model".to_string(), json!("llama3.2:3b"));
    store
        .create_or_append(Some(&id), "q2", "a2", &[], vec![], update)
        .unwrap();

    let record = store.load(&id).unwrap();
    assert_eq!(record.metadata["custom_tag"], "keep-me");
    assert_eq!(record.metadata["model"], "llama3.2:3b");
    assert_eq!(record.metadata["temperature"], json!(0.3));
}

#[test]
fn list_skips_corrupt_files() {
    let (_dir, store) = store();

    store
        .create_or_append(None, "good", "a", &[], vec![], Map::new())
        .unwrap();
    std::fs::write(store.storage_dir().join("broken.json"), "{not json").unwrap();

    let summaries = store.list(10).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].first_query, "good");
}

// The store is a whole-file read-modify-write with no locking or revision
// check. A writer that read the record before another writer's append will
// silently clobber that append when it writes back (last-writer-wins). This
// test pins down the limitation rather than guarding against it.
#[test]
fn concurrent_appenders_lose_updates_last_writer_wins() {
    let (_dir, store) = store();

    let id = store
        .create_or_append(None, "q1", "a1", &[], vec![], Map::new())
        .unwrap();

    // Writer B snapshots the file before writer A appends
    let path = store.storage_dir().join(format!("{}.json", id));
    let stale_snapshot = std::fs::read_to_string(&path).unwrap();

    // Writer A appends through the API
    store
        .create_or_append(Some(&id), "q2", "a2", &[], vec![], Map::new())
        .unwrap();
    assert_eq!(store.load(&id).unwrap().exchanges.len(), 2);

    // Writer B writes back its stale view; A's exchange is gone
    std::fs::write(&path, stale_snapshot).unwrap();
    assert_eq!(store.load(&id).unwrap().exchanges.len(), 1);
}
