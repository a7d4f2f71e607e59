//! Triage and flow prompts

use super::{join_blocks, modules, say, section, think};
use crate::templates::{FlowConfig, TriageConfig};

pub fn triage_prompt(config: &TriageConfig) -> String {
    let intro = format!(
        "Você é um agente de triagem prestativo especializado em análise e roteamento de consultas. \
Analise a mensagem do usuário, verifique se a pergunta está dentro do escopo de atuação do sistema de agentes \
e direcione-a para o agente mais adequado.\n\nSOBRE O TRIAGE AGENT:\n{}\n",
        config.about
    );

    join_blocks(&[
        intro,
        modules(&["READ", "SUMMARY", "EXTRACT", "ANALYZE", "ROUTE"]),
        section("READ", &[think("Leia cuidadosamente a mensagem do usuário.")]),
        section("SUMMARY", &[think("Faça um resumo da mensagem do usuário.")]),
        section(
            "EXTRACT",
            &[think("Extraia as informações relevantes da mensagem do usuário.")],
        ),
        section(
            "ANALYZE",
            &[
                think("Verifique se a pergunta está dentro do escopo de atuação descrito em SOBRE O TRIAGE AGENT."),
                think("Se estiver FORA DO ESCOPO, explique educadamente que o sistema é especializado no domínio configurado e sugira fontes apropriadas."),
            ],
        ),
        section(
            "ROUTE",
            &[
                think("Transfira para o agente adequado conforme as regras abaixo:"),
                config.render_routes(),
            ],
        ),
    ])
}

pub fn flow_prompt(config: &FlowConfig) -> String {
    let topics = config.render_topics();
    let keywords = config.render_keywords();

    join_blocks(&[
        "Você é um agente de fluxo. Seu objetivo é identificar qual tópico melhor representa a necessidade do usuário e transferir para o interview_agent.\n\
Se o usuário já especificou claramente um tópico, transfira imediatamente para o interview_agent.\n\
Se não especificou, apresente os tópicos disponíveis para o usuário escolher.\n"
            .to_string(),
        modules(&["READ", "SUMMARY", "ANALYZE", "QUESTION", "VERIFY", "REVIEW", "OUTPUT"]),
        section("READ", &[think("Leia cuidadosamente a mensagem do usuário.")]),
        section("SUMMARY", &[think("Faça um resumo breve do que o usuário deseja.")]),
        section(
            "ANALYZE",
            &[
                think("Verifique se a mensagem já especifica claramente um tópico usando as palavras-chave disponíveis:"),
                keywords.clone(),
                think("Se já especificou, transfira IMEDIATAMENTE para o interview_agent; caso contrário, prossiga para [QUESTION]."),
            ],
        ),
        section(
            "QUESTION",
            &[
                think("Enumere os tópicos disponíveis."),
                say(&format!(
                    "\"Claro! Posso ajudar com estes tópicos:\n{}\nQual deles representa melhor a sua necessidade?\"",
                    topics
                )),
                say("Explique que ele pode responder com o número, com o nome do tópico ou confirmar com \"sim\" a última opção sugerida."),
            ],
        ),
        section(
            "VERIFY",
            &[
                think("Confirme se a resposta do usuário corresponde a algum tópico ou às palavras-chave:"),
                keywords,
                think("Uma resposta como \"sim\" ou \"ok\" confirma o último tópico sugerido."),
                think("Se ainda não houver resposta válida, retome o passo [QUESTION] no próximo turno."),
            ],
        ),
        section(
            "REVIEW",
            &[think("Verifique se compreendeu corretamente a escolha do usuário.")],
        ),
        section(
            "OUTPUT",
            &[think("Transfira a conversa para o interview_agent com o tópico identificado ou confirmado.")],
        ),
    ])
}
