//! Confirmation and knowledge prompts

use super::{join_blocks, modules, section, think};
use crate::templates::ReferenceConfig;

pub fn confirmation_prompt(config: &ReferenceConfig) -> String {
    join_blocks(&[
        format!(
            "Você é um agente de confirmação especializado.\n\
Você receberá uma dúvida ou pergunta do usuário e deverá confirmar a solicitação usando o template de confirmação.\n\n\
Escopo de atuação:\n{}\n",
            config.about
        ),
        modules(&[
            "READ", "SUMMARY", "EXTRACT", "CLARIFY", "CONFIRMATION", "REVIEW", "FORMAT", "ROLLBACK", "OUTPUT",
        ]),
        section(
            "READ",
            &[think("Leia cuidadosamente a mensagem do usuário e o contexto da solicitação.")],
        ),
        section("SUMMARY", &[think("Faça um resumo da solicitação do usuário.")]),
        section(
            "EXTRACT",
            &[think("Extraia as informações relevantes da mensagem do usuário.")],
        ),
        section(
            "CLARIFY",
            &[think("Se houver dúvidas ou informações insuficientes, pergunte ao usuário para esclarecer.")],
        ),
        section(
            "CONFIRMATION",
            &[
                think("Confirme a informação usando o template de confirmação disponível:"),
                config.template.trim_end().to_string(),
            ],
        ),
        section(
            "REVIEW",
            &[think("Toda resposta precisa ser referenciada ao template de confirmação.")],
        ),
        section(
            "FORMAT",
            &[
                think("Formate a resposta seguindo o padrão:"),
                config.format.trim_end().to_string(),
            ],
        ),
        section(
            "ROLLBACK",
            &[
                think("Se o usuário perguntar sobre outro tema que não envolve:"),
                config.about.trim_end().to_string(),
                think("volte para o agente de triagem."),
            ],
        ),
        section(
            "OUTPUT",
            &[think("Exponha a informação confirmada ao usuário de maneira clara e precisa.")],
        ),
    ])
}

pub fn knowledge_prompt(config: &ReferenceConfig) -> String {
    join_blocks(&[
        format!(
            "Você é um agente de conhecimento especializado.\n\
Você receberá uma pergunta do usuário e deverá responder utilizando os documentos de referência disponíveis.\n\n\
Os documentos de referência são:\n{}\n",
            config.about
        ),
        modules(&[
            "READ", "SUMMARY", "EXTRACT", "CLARIFY", "METADATA_DOCUMENTOS", "RAG", "REVIEW", "FORMAT", "ROLLBACK", "OUTPUT",
        ]),
        section(
            "READ",
            &[think("Leia cuidadosamente a mensagem do usuário e identifique o que está sendo perguntado.")],
        ),
        section("SUMMARY", &[think("Faça um resumo da pergunta do usuário.")]),
        section(
            "EXTRACT",
            &[think("Extraia as informações relevantes da pergunta do usuário.")],
        ),
        section(
            "CLARIFY",
            &[think("Se houver dúvidas ou informações insuficientes, pergunte ao usuário para esclarecer.")],
        ),
        section(
            "METADATA_DOCUMENTOS",
            &[
                think("Utilize o metadado dos documentos para escolher o documento correto para acionar o RAG:"),
                config.template.trim_end().to_string(),
            ],
        ),
        section(
            "RAG",
            &[
                think("Utilize a função go_to_rag, com o parâmetro question, para responder à pergunta do usuário."),
                think("Adicione referência ao documento de origem: question = \"[Documento]\" + \"[Pergunta do usuário]\"."),
                think("Execute a função go_to_rag apenas uma vez."),
            ],
        ),
        section(
            "REVIEW",
            &[think("Verifique se a resposta é clara, precisa e baseada nos documentos de referência.")],
        ),
        section(
            "FORMAT",
            &[
                think("Formate a resposta da função go_to_rag seguindo o padrão:"),
                config.format.trim_end().to_string(),
            ],
        ),
        section(
            "ROLLBACK",
            &[think("Se não encontrar informações adequadas nos documentos, informe ao usuário e sugira o agente de triagem.")],
        ),
        section(
            "OUTPUT",
            &[think("Exponha a resposta formatada com as referências aos documentos utilizados.")],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ReferenceConfig {
        ReferenceConfig {
            about: "Manual de códigos IVA".to_string(),
            format: "Código: <código> - <descrição>".to_string(),
            template: "| E1 | Energia produtiva |".to_string(),
        }
    }

    #[test]
    fn test_confirmation_prompt_sections() {
        let prompt = confirmation_prompt(&config());
        assert!(prompt.contains("Escopo de atuação:\nManual de códigos IVA"));
        assert!(prompt.contains("| E1 | Energia produtiva |"));
        assert!(prompt.contains("[ROLLBACK]"));
    }

    #[test]
    fn test_knowledge_prompt_mentions_tool() {
        let prompt = knowledge_prompt(&config());
        assert!(prompt.contains("go_to_rag"));
        assert!(prompt.contains("Código: <código> - <descrição>"));
    }
}
