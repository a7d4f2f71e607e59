//! Indexing the knowledge folder and answering through `go_to_rag`

mod common;

use atendente::agent::{AgentKind, RunEvent};
use atendente::llm::{ChatMessage, ToolCall};
use atendente::rag::{EmbeddingStore, KnowledgeToolResult};
use atendente::repl::TurnOutcome;
use common::{services, standard_dir, workspace, FakeModel, SYNTHESIZED_ANSWER};

const SOURCE: &str = "procedimentos_fiscais.md";

#[tokio::test]
async fn test_index_round_trips_through_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let store_file = dir.path().join("embedding").join("embeddings.json");
    let workspace = workspace(Some(store_file.clone()));
    let services = services(FakeModel::new(Vec::new()));

    let store = services
        .indexer(&workspace.settings, false)
        .build(&standard_dir().join("knowledge"))
        .await
        .unwrap();
    assert!(!store.is_empty());
    assert_eq!(store.model, "keyword-embedder");
    assert!(store.records.iter().all(|r| r.chunk.source == SOURCE));
    assert!(store.records.iter().all(|r| r.chunk.content.trim().chars().count() > 100));

    store.save(&store_file).unwrap();
    let loaded = EmbeddingStore::load(&store_file).unwrap();
    assert_eq!(loaded.len(), store.len());
    assert_eq!(loaded.records[0].embedding, store.records[0].embedding);
}

#[tokio::test]
async fn test_knowledge_agent_answers_with_sources() {
    let dir = tempfile::tempdir().unwrap();
    let store_file = dir.path().join("embeddings.json");
    let workspace = workspace(Some(store_file.clone()));

    let question = "Como funciona o crédito de ICMS do ativo imobilizado?";
    let model = FakeModel::new(vec![
        ChatMessage::assistant_tool_calls(vec![ToolCall::new(
            "go_to_rag",
            serde_json::json!({ "question": question }).to_string(),
        )]),
        ChatMessage::assistant("O crédito é apropriado em 48 parcelas mensais. Fonte: procedimentos_fiscais.md"),
    ]);
    let services = services(model.clone());
    services
        .indexer(&workspace.settings, false)
        .build(&workspace.settings.knowledge_dir())
        .await
        .unwrap()
        .save(&store_file)
        .unwrap();

    let mut conversation = services.conversation(&workspace, AgentKind::Knowledge).unwrap();
    let outcome = conversation.send(question).await;

    let events = match outcome {
        TurnOutcome::Reply { agent, events, .. } => {
            assert_eq!(agent, AgentKind::Knowledge);
            events
        }
        other => panic!("unexpected outcome: {:?}", other),
    };

    let output = events
        .iter()
        .find_map(|event| match event {
            RunEvent::ToolOutput { tool, output, .. } if tool == "go_to_rag" => Some(output.clone()),
            _ => None,
        })
        .expect("go_to_rag was not called");
    let result: KnowledgeToolResult = serde_json::from_str(&output).unwrap();
    assert_eq!(result.answer, SYNTHESIZED_ANSWER);
    assert_eq!(result.sources, vec![SOURCE.to_string()]);
    assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    assert!(result.context.starts_with(&format!("Documento: {}", SOURCE)));

    // the tool output is fed back to the agent on its second turn
    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].messages.iter().any(|m| m.text().contains(SYNTHESIZED_ANSWER)));
}

#[tokio::test]
async fn test_missing_store_gives_fixed_answer() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = workspace(Some(dir.path().join("absent.json")));
    let services = services(FakeModel::new(Vec::new()));

    let result = services
        .knowledge_tool(&workspace.settings)
        .answer("Qual o prazo de lançamento das notas?")
        .await;

    assert!(result.sources.is_empty());
    assert_eq!(result.confidence, 0.0);
    assert!(result.context.is_empty());
}
