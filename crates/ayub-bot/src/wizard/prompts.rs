//! User-facing texts of the configuration dialog.
//!
//! Wording lives here, away from the state machine; the engine only decides
//! which question to ask next.

use group_config::GroupConfig;

const FOOTER: &str = "\n\nDigite *voltar* para a etapa anterior ou *cancelar* para sair.";

pub fn initial(groups: &[String]) -> String {
    let mut text = String::from("⚙️ *Configuração de resumos*\n\n");

    if groups.is_empty() {
        text.push_str("Nenhum grupo configurado ainda.\n\n");
    } else {
        text.push_str("Grupos já configurados:\n");
        for (i, name) in groups.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", i + 1, name));
        }
        text.push('\n');
        text.push_str("Responda com o *número* para editar um grupo, ou\n");
    }

    text.push_str("envie o *nome* de um grupo para configurá-lo.");
    text.push_str("\n\nDigite *cancelar* para sair.");
    text
}

pub fn config_choice(group: &str) -> String {
    format!(
        "Grupo *{}*.\n\n1. Usar configuração padrão\n2. Personalizar{}",
        group, FOOTER
    )
}

pub fn describe(config: &GroupConfig) -> String {
    let delete = match config.delete_after_minutes {
        Some(minutes) => format!("{} min", minutes),
        None => "desativada".into(),
    };
    let prompt = if config.prompt.is_some() {
        "personalizado"
    } else {
        "padrão"
    };

    format!(
        "• Resumos: {}\n• Intervalo: a cada {}h\n• Silêncio: {} às {}\n• Autodestruição: {}\n• Prompt: {}",
        if config.enabled { "ativados" } else { "desativados" },
        config.interval_hours,
        config.quiet.start.format("%H:%M"),
        config.quiet.end.format("%H:%M"),
        delete,
        prompt,
    )
}

pub fn edit_menu(group: &str, config: &GroupConfig) -> String {
    format!(
        "Editando *{}*:\n{}\n\nO que alterar?\n1. {} resumos\n2. Intervalo\n3. Horário de silêncio\n4. Autodestruição\n5. Prompt do resumo\n6. Remover grupo{}",
        group,
        describe(config),
        if config.enabled { "Desativar" } else { "Ativar" },
        FOOTER
    )
}

pub fn interval() -> String {
    format!(
        "De quantas em quantas horas mando o resumo? (1 a 24){}",
        FOOTER
    )
}

pub fn quiet_start() -> String {
    format!(
        "Início do horário de silêncio? (formato HH:MM, ex.: 22:00){}",
        FOOTER
    )
}

pub fn quiet_end() -> String {
    format!(
        "Fim do horário de silêncio? (formato HH:MM, ex.: 07:00){}",
        FOOTER
    )
}

pub fn auto_delete_choice() -> String {
    format!(
        "Os resumos devem se autodestruir depois de um tempo?\n1. Sim\n2. Não{}",
        FOOTER
    )
}

pub fn auto_delete_time() -> String {
    format!(
        "Apagar depois de quanto tempo? (ex.: 30m ou 2h){}",
        FOOTER
    )
}

pub fn group_info() -> String {
    format!(
        "Me conta em poucas palavras sobre o que é o grupo, para eu montar um prompt de resumo sob medida.{}",
        FOOTER
    )
}

pub fn draft_failed() -> String {
    format!(
        "Não consegui gerar o prompt agora. 😕\n\n1. Tentar de novo\n2. Escrever meu próprio prompt\n3. Usar o prompt padrão\n\nOu mande outra descrição do grupo.{}",
        FOOTER
    )
}

pub fn prompt_approval(draft: &str) -> String {
    format!(
        "Olha o prompt que preparei:\n\n_{}_\n\n1. Usar esse\n2. Escrever meu próprio\n3. Usar o prompt padrão{}",
        draft, FOOTER
    )
}

pub fn custom_prompt() -> String {
    format!("Manda o prompt do seu jeito.{}", FOOTER)
}

pub fn delete_confirm(group: &str) -> String {
    format!(
        "Remover a configuração de *{}*? Isso desliga os resumos do grupo.\n\nResponda *sim* ou *não*.{}",
        group, FOOTER
    )
}

// Confirmations and terminal replies

pub fn committed(group: &str, config: &GroupConfig) -> String {
    format!(
        "✅ Pronto! Configuração de *{}* salva:\n{}",
        group,
        describe(config)
    )
}

pub fn removed(group: &str) -> String {
    format!("🗑️ Configuração de *{}* removida.", group)
}

pub fn updated(group: &str) -> String {
    format!("✅ *{}* atualizado.", group)
}

pub fn toggled(group: &str, enabled: bool) -> String {
    format!(
        "✅ Resumos de *{}* {}.",
        group,
        if enabled { "ativados" } else { "desativados" }
    )
}

pub fn deletion_kept(group: &str) -> String {
    format!("Ok, *{}* continua configurado.", group)
}

pub fn cancelled() -> String {
    "Configuração cancelada. Nada foi salvo.".into()
}

pub fn session_expired() -> String {
    "A configuração expirou por inatividade. Manda *!config* para recomeçar.".into()
}

pub fn commit_failed() -> String {
    "Não consegui salvar a configuração. 😕 Tenta de novo com *!config*.".into()
}

pub fn generic_failure() -> String {
    "Deu algo errado na configuração. Manda *!config* para recomeçar.".into()
}

pub fn no_active_session() -> String {
    "Nenhuma configuração em andamento. Manda *!config* para começar.".into()
}

// Validation annotations

pub fn invalid_option() -> &'static str {
    "Opção inválida."
}

pub fn invalid_interval() -> &'static str {
    "Valor inválido: preciso de um número de 1 a 24."
}

pub fn invalid_time() -> &'static str {
    "Horário inválido: use o formato HH:MM."
}

pub fn invalid_duration() -> &'static str {
    "Tempo inválido: use algo como 30m ou 2h."
}

pub fn empty_text() -> &'static str {
    "Preciso de um texto."
}
