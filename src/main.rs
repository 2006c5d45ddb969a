use anyhow::{bail, Context};
use clap::Parser;
use coverform::adapters::{ApiClient, DraftAutosaver, FileDraftStore, FilePreferenceStore, MockApiState};
use coverform::cli::{Cli, Command};
use coverform::config::{self, Settings};
use coverform::domain::{AnswerMap, AnswerValue, FormError};
use coverform::engine::{InputKind, RenderNode};
use coverform::i18n::{self, Message};
use coverform::preferences::{LocaleContext, Theme, ThemeContext};
use coverform::session::FormSession;
use coverform::table::{cell_text, SortOrder, SubmissionTable};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    let prefs = FilePreferenceStore::new(&settings.preferences.path);
    let locale = LocaleContext::new(prefs.clone(), system_locales());

    match cli.command {
        Command::Forms => list_forms(&settings).await,
        Command::Render { form_id, answers, json } => render(&settings, &form_id, answers.as_deref(), json).await,
        Command::Set {
            form_id,
            field_id,
            value,
            flag,
            choice,
            off,
        } => set_answer(&settings, &form_id, &field_id, &value, flag, choice, off).await,
        Command::Validate { form_id, answers } => validate(&settings, &form_id, answers.as_deref()).await,
        Command::Submit { form_id, answers } => submit(&settings, &locale, &form_id, answers.as_deref()).await,
        Command::Submissions {
            search,
            sort,
            desc,
            page,
            hide,
        } => submissions(&settings, &locale, search, sort, desc, page, &hide).await,
        Command::Prefs { toggle_theme, locale: new_locale } => {
            preferences(prefs, locale, toggle_theme, new_locale)
        }
        Command::Serve { .. } => serve(&settings).await,
    }
}

/// Language tags from the usual locale environment variables
fn system_locales() -> Vec<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|v| !v.is_empty())
        .collect()
}

fn client(settings: &Settings) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(&settings.api.base_url, settings.api.timeout())?)
}

/// Session with `form_id` selected and its draft (or an answers file) loaded
async fn open_session(
    settings: &Settings,
    client: &ApiClient,
    form_id: &str,
    answers_file: Option<&Path>,
) -> anyhow::Result<FormSession<FileDraftStore>> {
    let mut session = FormSession::new(FileDraftStore::new(&settings.drafts.dir));
    session.load_forms(client.list_forms().await?)?;
    session.select_form(form_id)?;

    if let Some(path) = answers_file {
        let content = std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        let answers: AnswerMap = serde_json::from_str(&content)?;
        for (id, value) in answers.iter() {
            session.set_answer(id.clone(), value.clone());
        }
    }

    Ok(session)
}

async fn list_forms(settings: &Settings) -> anyhow::Result<()> {
    let forms = client(settings)?.list_forms().await?;
    for form in &forms {
        println!("{:<20} {:<40} {} fields", form.form_id, form.title, form.fields.len());
    }
    Ok(())
}

async fn render(settings: &Settings, form_id: &str, answers: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let client = client(settings)?;
    let mut session = open_session(settings, &client, form_id, answers).await?;
    session.resolve_options(&client).await;

    let nodes = session.render();
    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
    } else {
        if let Some(form) = session.selected_form() {
            println!("{}", form.title);
        }
        print_nodes(&nodes, 1);
    }
    Ok(())
}

fn print_nodes(nodes: &[RenderNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        let marker = if node.required { "*" } else { "" };
        let state = if node.disabled { " (disabled)" } else { "" };
        let kind = match &node.input {
            InputKind::Error(message) => format!("error: {}", message),
            other => other.name().to_string(),
        };
        println!("{}{}{} [{}]{} = {}", indent, node.label, marker, kind, state, node.value);

        if !node.options.is_empty() {
            let options: Vec<String> = node
                .options
                .iter()
                .map(|o| {
                    let mark = if node.is_checked(&o.value) { "x" } else { " " };
                    format!("[{}] {}", mark, o.label)
                })
                .collect();
            println!("{}  {}", indent, options.join("  "));
        }

        print_nodes(&node.members, depth + 1);
        print_nodes(&node.children, depth + 1);
    }
}

async fn set_answer(
    settings: &Settings,
    form_id: &str,
    field_id: &str,
    value: &str,
    flag: bool,
    choice: bool,
    off: bool,
) -> anyhow::Result<()> {
    let client = client(settings)?;
    let mut session = open_session(settings, &client, form_id, None).await?;

    if choice {
        session.toggle_choice(field_id, value, !off);
    } else if flag {
        let parsed: bool = value
            .parse()
            .with_context(|| format!("'{}' is not true or false", value))?;
        session.set_answer(field_id, AnswerValue::Flag(parsed));
    } else {
        session.set_answer(field_id, value);
    }

    let saver = DraftAutosaver::spawn(session.drafts().clone(), settings.drafts.debounce());
    saver.schedule(form_id, session.answers())?;
    saver.shutdown().await?;

    println!("{}", serde_json::to_string_pretty(session.answers())?);
    Ok(())
}

async fn validate(settings: &Settings, form_id: &str, answers: Option<&Path>) -> anyhow::Result<()> {
    let client = client(settings)?;
    let session = open_session(settings, &client, form_id, answers).await?;

    let errors = session.validate();
    if errors.is_empty() {
        println!("OK");
        return Ok(());
    }
    for error in &errors {
        println!("{}", error);
    }
    bail!("{} required field(s) missing", errors.len())
}

async fn submit(
    settings: &Settings,
    locale: &LocaleContext<FilePreferenceStore>,
    form_id: &str,
    answers: Option<&Path>,
) -> anyhow::Result<()> {
    let client = client(settings)?;
    let mut session = open_session(settings, &client, form_id, answers).await?;

    let payload = match session.prepare_submission() {
        Ok(answers) => answers.clone(),
        Err(FormError::Validation(errors)) => {
            println!("{}", locale.translate(Message::ValidationFailed));
            for error in &errors {
                println!("  {}", error);
            }
            bail!("{} required field(s) missing", errors.len());
        }
        Err(e) => return Err(e.into()),
    };

    match client.submit(&payload).await {
        Ok(()) => {
            session.complete_submission(form_id, &payload)?;
            println!("{}", locale.translate(Message::SubmitSuccess));
            Ok(())
        }
        Err(e) => {
            // Answers stay in the draft so nothing is lost
            session.persist_draft()?;
            println!("{}", locale.translate(Message::SubmitFailure));
            Err(e.into())
        }
    }
}

async fn submissions(
    settings: &Settings,
    locale: &LocaleContext<FilePreferenceStore>,
    search: Option<String>,
    sort: Option<String>,
    desc: bool,
    page: usize,
    hide: &[String],
) -> anyhow::Result<()> {
    let data = client(settings)?.list_submissions().await?;
    let mut table = SubmissionTable::new(data);

    for column in hide {
        table.toggle_column(column);
    }
    if let Some(query) = search {
        table.set_search(query);
    }
    if let Some(column) = sort {
        let order = if desc { SortOrder::Descending } else { SortOrder::Ascending };
        table.set_sort(&column, order);
    }
    table.go_to(page.saturating_sub(1));

    println!("{}", locale.translate(Message::SubmittedApps));
    let rows = table.rows();
    if rows.is_empty() {
        println!("{}", locale.translate(Message::NoData));
        return Ok(());
    }

    println!("{}", table.visible_columns().join("\t"));
    for row in rows {
        let cells: Vec<String> = table.visible_columns().iter().map(|c| cell_text(row, c)).collect();
        println!("{}", cells.join("\t"));
    }
    println!(
        "{}",
        i18n::page_of(locale.locale(), table.page() + 1, table.total_pages().max(1))
    );
    Ok(())
}

fn preferences(
    store: FilePreferenceStore,
    mut locale: LocaleContext<FilePreferenceStore>,
    toggle_theme: bool,
    new_locale: Option<i18n::Locale>,
) -> anyhow::Result<()> {
    let mut theme = ThemeContext::new(store, Theme::Light);

    if toggle_theme {
        theme.toggle()?;
    }
    if let Some(new_locale) = new_locale {
        locale.set(new_locale)?;
    }

    let theme_label = if theme.is_dark() {
        locale.translate(Message::DarkMode)
    } else {
        locale.translate(Message::LightMode)
    };
    println!("{}", theme_label);
    println!("{} ({})", locale.locale().native_name(), locale.locale().code());
    Ok(())
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let forms = config::load_forms_from_dir(&settings.server.forms_dir)?;
    let option_lists = config::load_option_lists_from_dir(&settings.server.options_dir)?;
    info!(
        "Loaded {} forms and {} option lists",
        forms.len(),
        option_lists.len()
    );

    let app = coverform::create_app(MockApiState::new(forms, option_lists));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!("Mock insurance API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
