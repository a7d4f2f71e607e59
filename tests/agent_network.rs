//! Network assembly from the standard templates

mod common;

use atendente::agent::{append_handoff_summary, AgentKind, ContextNote};
use atendente::llm::{ChatMessage, Role};
use atendente::prompts;
use atendente::AtendenteError;
use common::{services, transfer, workspace, FakeModel};

#[test]
fn test_standard_network_wires_guardrails_and_tools() {
    let workspace = workspace(None);
    let network = services(FakeModel::new(Vec::new())).network(&workspace).unwrap();

    assert_eq!(network.agents().count(), AgentKind::ALL.len());

    let triage = network.get(AgentKind::Triage).unwrap();
    assert_eq!(triage.guardrail_names(), vec!["scope"]);

    let confirmation = network.get(AgentKind::Confirmation).unwrap();
    assert_eq!(confirmation.guardrail_names(), vec!["scope", "keywords"]);

    let knowledge = network.get(AgentKind::Knowledge).unwrap();
    assert_eq!(knowledge.guardrail_names(), vec!["scope"]);
    assert_eq!(knowledge.tools.names(), ["go_to_rag".to_string()]);

    let usage = network.get(AgentKind::Usage).unwrap();
    assert!(usage.guardrail_names().is_empty());
    // transfer back to triage only
    assert_eq!(usage.tool_definitions().len(), 1);
}

#[test]
fn test_prompts_carry_template_content() {
    let workspace = workspace(None);

    let flow = prompts::instructions_for(AgentKind::Flow, &workspace.templates);
    assert!(flow.contains("Compra de insumos para industrialização"));
    assert!(flow.contains("\"matéria-prima\""));

    let answer = prompts::instructions_for(AgentKind::Answer, &workspace.templates);
    assert!(answer.contains("Código IVA recomendado"));

    let triage = prompts::instructions_for(AgentKind::Triage, &workspace.templates);
    assert!(triage.contains("confirmation_agent"));
}

#[tokio::test]
async fn test_flow_output_becomes_handoff_summary() {
    let workspace = workspace(None);
    let model = FakeModel::new(vec![
        transfer("transfer_to_flow_agent"),
        ChatMessage::assistant(r#"{"topic": "servicos", "reasoning": "consultoria"}"#),
    ]);
    let services = services(model.clone());
    let network = services.network(&workspace).unwrap();
    let runner = services.runner(&workspace.settings);
    let mut context = ContextNote::new();

    let result = runner
        .run(
            &network,
            AgentKind::Triage,
            vec![ChatMessage::user("Qual código usar para um serviço de consultoria?")],
            &mut context,
        )
        .await
        .unwrap();
    assert_eq!(result.last_agent, AgentKind::Flow);

    let items = append_handoff_summary(&result, &mut context, "flow", Some("Interview Agent"), None);

    let summary = context.summary("flow").unwrap();
    assert_eq!(summary.from_agent, "Flow Agent");
    assert_eq!(summary.next_agent_hint, "Interview Agent");
    assert_eq!(summary.payload["topic"], "servicos");

    let last = items.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.text().starts_with("[HANDOFF_SUMMARY]"));
    assert_eq!(context.agent_path, vec!["Triage Agent", "Flow Agent"]);
}

#[tokio::test]
async fn test_structured_answer_is_requested_and_validated() {
    let mut workspace = workspace(None);
    workspace.settings.agents.structured_outputs = true;
    let model = FakeModel::new(vec![ChatMessage::assistant(r#"{"topic": "servicos", "code": "S1"}"#)]);
    let services = services(model.clone());
    let network = services.network(&workspace).unwrap();
    let runner = services.runner(&workspace.settings);
    let mut context = ContextNote::new();

    let result = runner
        .run(
            &network,
            AgentKind::Answer,
            vec![ChatMessage::user("Consultoria tributária prestada por empresa local")],
            &mut context,
        )
        .await
        .unwrap();

    let output = result.structured_output.unwrap();
    assert_eq!(output["topic"], "servicos");
    assert_eq!(output["code"], "S1");

    let requests = model.requests.lock().unwrap();
    let format = requests[0].response_format.as_ref().unwrap();
    assert_eq!(format["type"], "json_schema");
    assert_eq!(format["json_schema"]["name"], "AnswerOutput");
    let topics = format["json_schema"]["schema"]["properties"]["topic"]["enum"]
        .as_array()
        .unwrap();
    assert_eq!(topics.len(), 4);
}

#[tokio::test]
async fn test_structured_answer_with_code_outside_topic_fails() {
    let mut workspace = workspace(None);
    workspace.settings.agents.structured_outputs = true;
    // A1 belongs to ativo_imobilizado
    let model = FakeModel::new(vec![ChatMessage::assistant(r#"{"topic": "servicos", "code": "A1"}"#)]);
    let services = services(model);
    let network = services.network(&workspace).unwrap();
    let runner = services.runner(&workspace.settings);
    let mut context = ContextNote::new();

    let err = runner
        .run(
            &network,
            AgentKind::Answer,
            vec![ChatMessage::user("Consultoria tributária prestada por empresa local")],
            &mut context,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AtendenteError::InvalidOutput(_)));
    assert!(context.agent_path.is_empty());
}

#[tokio::test]
async fn test_plain_answer_when_structured_outputs_disabled() {
    let workspace = workspace(None);
    let model = FakeModel::new(vec![ChatMessage::assistant("Código IVA recomendado: S1")]);
    let services = services(model.clone());
    let network = services.network(&workspace).unwrap();
    let runner = services.runner(&workspace.settings);

    let result = runner
        .run(
            &network,
            AgentKind::Answer,
            vec![ChatMessage::user("Consultoria tributária")],
            &mut ContextNote::new(),
        )
        .await
        .unwrap();

    assert!(result.structured_output.is_none());
    assert!(model.requests.lock().unwrap()[0].response_format.is_none());
}
