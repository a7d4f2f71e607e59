//! Chat turns through `Conversation`: replies, guardrail blocks and failures

mod common;

use atendente::agent::AgentKind;
use atendente::llm::{ChatMessage, Role};
use atendente::repl::TurnOutcome;
use common::{services, transfer, workspace, FakeModel};

#[tokio::test]
async fn test_reply_moves_conversation_to_last_agent() {
    let workspace = workspace(None);
    let model = FakeModel::new(vec![
        transfer("transfer_to_flow_agent"),
        ChatMessage::assistant("Qual destes tópicos descreve sua compra?"),
    ]);
    let mut conversation = services(model.clone())
        .conversation(&workspace, AgentKind::Triage)
        .unwrap();

    let outcome = conversation.send("Preciso de um código IVA para frete").await;

    match outcome {
        TurnOutcome::Reply { agent, text, events } => {
            assert_eq!(agent, AgentKind::Flow);
            assert_eq!(text, "Qual destes tópicos descreve sua compra?");
            assert!(!events.is_empty());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(conversation.session().current_agent(), AgentKind::Flow);
    assert_eq!(model.agent_turns(), 2);

    // the next message goes straight to the flow agent, without the triage scope check
    let evaluations = *model.evaluations.lock().unwrap();
    conversation.send("É um frete de transporte").await;
    assert_eq!(*model.evaluations.lock().unwrap(), evaluations);
    let requests = model.requests.lock().unwrap();
    // transfers to interview and back to triage
    assert_eq!(requests[2].tools.len(), 2);
}

#[tokio::test]
async fn test_out_of_scope_message_is_blocked() {
    let workspace = workspace(None);
    let model = FakeModel::new(Vec::new());
    let mut conversation = services(model.clone())
        .conversation(&workspace, AgentKind::Triage)
        .unwrap();

    let outcome = conversation.send("Como resolver 2x + 5 = 11?").await;

    match outcome {
        TurnOutcome::Blocked { title, message } => {
            assert_eq!(title, "🚫 Pergunta fora do escopo");
            assert!(message.contains("códigos IVA"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(model.agent_turns(), 0);

    let history = conversation.session().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, Role::Assistant);
    assert!(history[1].text().starts_with("Pergunta fora do escopo."));
    assert_eq!(conversation.session().telemetry().stats().guardrail_trips, 1);
}

#[tokio::test]
async fn test_keyword_guardrail_blocks_code_out_of_context() {
    let workspace = workspace(None);
    let model = FakeModel::new(Vec::new());
    let mut conversation = services(model.clone())
        .conversation(&workspace, AgentKind::Confirmation)
        .unwrap();

    let outcome = conversation
        .send("O código A1 está certo para material de escritório?")
        .await;

    assert!(matches!(outcome, TurnOutcome::Blocked { .. }));
    assert_eq!(model.agent_turns(), 0);
}

#[tokio::test]
async fn test_failed_run_drops_message_and_keeps_agent() {
    let workspace = workspace(None);
    // answer_agent is not a triage target
    let model = FakeModel::new(vec![transfer("transfer_to_answer_agent")]);
    let mut conversation = services(model)
        .conversation(&workspace, AgentKind::Triage)
        .unwrap();

    let outcome = conversation.send("Qual código usar para insumo?").await;

    match outcome {
        TurnOutcome::Failed { message, error } => {
            assert!(message.contains("erro técnico"));
            assert!(error.contains("Answer Agent"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(conversation.session().history().is_empty());
    assert_eq!(conversation.session().current_agent(), AgentKind::Triage);
    assert_eq!(conversation.session().telemetry().stats().failed_turns, 1);
}
