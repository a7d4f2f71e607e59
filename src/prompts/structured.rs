//! Interview and answer prompts

use super::{join_blocks, modules, section, think};
use crate::templates::{AnswerConfig, FlowConfig, InterviewConfig};

pub fn interview_prompt(interview: &InterviewConfig, flow: &FlowConfig) -> String {
    join_blocks(&[
        "Você é um agente de entrevista especializado.\n\
Você deverá entrevistar o usuário para obter informações relevantes sobre o tópico identificado.\n\n\
IMPORTANTE: NÃO preencha o output automaticamente. Faça as perguntas da entrevista primeiro \
e só preencha o output após receber as respostas do usuário.\n"
            .to_string(),
        modules(&[
            "READ", "SUMMARY", "EXTRACT", "ANALYZE", "ROUTE", "QUESTIONS", "VERIFY", "REVIEW", "OUTPUT",
        ]),
        section(
            "READ",
            &[think("Leia cuidadosamente a mensagem do usuário e o contexto do tópico identificado.")],
        ),
        section(
            "SUMMARY",
            &[think("Faça um resumo da situação e do tópico a ser entrevistado.")],
        ),
        section(
            "EXTRACT",
            &[think("Extraia as informações já disponíveis da mensagem do usuário.")],
        ),
        section(
            "ANALYZE",
            &[think("Analise quais informações ainda são necessárias para completar o entendimento do caso.")],
        ),
        section(
            "ROUTE",
            &[
                think("Verifique qual tópico deve ser entrevistado baseado no contexto:"),
                flow.render_topics(),
            ],
        ),
        section(
            "QUESTIONS",
            &[
                think("Faça uma pergunta por vez, aguardando a resposta antes de prosseguir."),
                think("Use as perguntas estruturadas disponíveis:"),
                interview.interview_questions.trim_end().to_string(),
            ],
        ),
        section(
            "VERIFY",
            &[think("Verifique se todas as informações necessárias foram coletadas.")],
        ),
        section(
            "REVIEW",
            &[think("Revise todas as informações coletadas durante a entrevista.")],
        ),
        section(
            "OUTPUT",
            &[think("Assim que tiver todas as respostas necessárias, transfira a conversa para answer_agent com as informações coletadas.")],
        ),
    ])
}

pub fn answer_prompt(answer: &AnswerConfig) -> String {
    join_blocks(&[
        "Você é um agente de resposta especializado.\n\
Responda à pergunta do usuário usando o template de resposta configurado e as informações coletadas durante a entrevista.\n"
            .to_string(),
        modules(&[
            "READ", "SUMMARY", "EXTRACT", "ANALYZE", "ROUTE", "VERIFY", "REVIEW", "FORMAT", "OUTPUT",
        ]),
        section(
            "READ",
            &[think("Leia cuidadosamente a mensagem do usuário e as informações coletadas.")],
        ),
        section(
            "SUMMARY",
            &[think("Faça um resumo da situação e das informações disponíveis.")],
        ),
        section(
            "EXTRACT",
            &[think("Extraia as informações relevantes da mensagem do usuário e do contexto da entrevista.")],
        ),
        section(
            "ANALYZE",
            &[think("Identifique o que é necessário para responder adequadamente.")],
        ),
        section(
            "ROUTE",
            &[
                think("Responda usando o template de resposta como guia:"),
                answer.answer_template.trim_end().to_string(),
            ],
        ),
        section(
            "VERIFY",
            &[think("Verifique se a resposta segue o template e responde completamente à pergunta.")],
        ),
        section(
            "REVIEW",
            &[think("Revise a resposta para garantir clareza e precisão.")],
        ),
        section(
            "FORMAT",
            &[think("Formate a resposta de maneira clara e objetiva.")],
        ),
        section(
            "OUTPUT",
            &[think("Gere uma resposta completa para o usuário com as informações estruturadas.")],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interview_prompt_embeds_questions() {
        let interview = InterviewConfig {
            interview_questions: "1.1 O material é revendido?\n".to_string(),
        };
        let prompt = interview_prompt(&interview, &FlowConfig::default());
        assert!(prompt.contains("1.1 O material é revendido?"));
        assert!(prompt.contains("transfira a conversa para answer_agent"));
    }

    #[test]
    fn test_answer_prompt_embeds_template() {
        let answer = AnswerConfig {
            answer_template: "Código sugerido: {code}".to_string(),
            ..Default::default()
        };
        assert!(answer_prompt(&answer).contains("Código sugerido: {code}"));
    }
}
