//! Render orchestration for the surprise TUI

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use surprise_core::choices::{REQUIRED_ESCAPEES, REQUIRED_ITEMS};
use surprise_core::{Plan, SceneId};

use crate::app::App;
use crate::ui::widgets::{
    ChecklistEntry, ChecklistWidget, PhotoCard, PhotoRainWidget, StoryWidget, VideoModalWidget,
};

const START_LABEL: &str = "Başla";
const CONTINUE_LABEL: &str = "Devam et";
const ESCAPE_LABEL: &str = "Kaçalım";
const STAY_LABEL: &str = "Kalalım";
const ENVELOPE_LABEL: &str = "Zarfı aç";
const VIDEO_LABEL: &str = "Edit Zamanı Geldi...";

const LOADING_TEXT: &str = "Doğum günü yükleniyor";
const LOAD_ERROR_TEXT: &str = "HATA 404: Doğum günü bulunamadı. Lütfen daha sonra tekrar deneyin.";
const PHOTO_ERROR_TEXT: &str = "HATA: Anılar beklenenden fazla. Bellek taşıyor...";

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let [body, status_bar] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    match app.scene() {
        SceneId::Start => render_start(frame, app, body),
        SceneId::FakeLoading => render_fake_loading(frame, app, body),
        SceneId::Photos => render_photos(frame, app, body),
        SceneId::IsItOver => render_is_it_over(frame, app, body),
        SceneId::IslandItems => render_items(frame, app, body),
        SceneId::IslandPerson => render_person(frame, app, body),
        SceneId::Dilemma => render_dilemma(frame, app, body),
        SceneId::EscapePeople => render_escapees(frame, app, body),
        SceneId::ActivityPlan => render_plans(frame, app, body),
        SceneId::FinalStory => render_final_story(frame, app, body),
        SceneId::Letter => render_letter(frame, app, body),
    }

    render_status_bar(frame, app, status_bar);

    if app.session.stage().video.open {
        let modal = VideoModalWidget::new(&app.session.stage().video, &app.theme)
            .path(app.video_path())
            .player(app.player_command());
        frame.render_widget(modal, centered_rect(60, 40, area));
    }
}

/// A rect `percent_x` by `percent_y` of `area`, centered in it.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn render_checklist(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    prompt: &str,
    entries: &[ChecklistEntry],
    warning: Option<&str>,
) {
    let widget = ChecklistWidget::new(entries, &app.theme)
        .title(title)
        .prompt(prompt)
        .cursor(app.cursor)
        .warning(warning)
        .scroll(app.scroll);
    frame.render_widget(widget, centered_rect(80, 80, area));
}

fn render_start(frame: &mut Frame, app: &App, area: Rect) {
    let honoree = &app.session.config().honoree;
    let prompt = format!("{}, senin için bir şey hazırladık. Hazır olduğunda başla.", honoree.name);
    let entries = [ChecklistEntry::button(START_LABEL)];
    render_checklist(frame, app, area, "Sürpriz", &prompt, &entries, None);
}

fn render_fake_loading(frame: &mut Frame, app: &App, area: Rect) {
    let stage = app.session.stage();
    if !stage.load_error_visible {
        let dots = ".".repeat(usize::from(app.animation_frame / 3 % 4));
        let text = Paragraph::new(Span::styled(
            format!("{LOADING_TEXT}{dots}"),
            app.theme.loading_style(),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(text, centered_rect(80, 10, area));
        return;
    }

    let entries = [ChecklistEntry::button(stage.go_back_label).enabled(!stage.go_back_disabled)];
    let widget = ChecklistWidget::new(&entries, &app.theme)
        .title("Hata")
        .prompt(LOAD_ERROR_TEXT)
        .cursor(app.cursor);
    frame.render_widget(widget, centered_rect(60, 40, area));
}

fn render_photos(frame: &mut Frame, app: &App, area: Rect) {
    let stage = app.session.stage();
    let cards: Vec<PhotoCard> = stage
        .photos
        .iter()
        .enumerate()
        .map(|(n, photo)| PhotoCard {
            label: app
                .session
                .photo_url(photo.index)
                .unwrap_or_default()
                .to_string(),
            left_percent: photo.left_percent,
            progress: photo.progress(app.photo_elapsed(n)),
        })
        .collect();

    let error = stage.photo_error_visible.then_some(PHOTO_ERROR_TEXT);
    frame.render_widget(PhotoRainWidget::new(&cards, &app.theme).error(error), area);
}

fn render_is_it_over(frame: &mut Frame, app: &App, area: Rect) {
    let entries = app
        .session
        .stage()
        .is_it_over_labels()
        .map(ChecklistEntry::button);
    render_checklist(frame, app, area, "Bitti mi?", "Sence bitti mi?", &entries, None);
}

fn render_items(frame: &mut Frame, app: &App, area: Rect) {
    let choices = app.session.choices();
    let selection = choices.item_selection();
    let gate = choices.items_gate();

    let mut entries: Vec<ChecklistEntry> = choices
        .catalog()
        .items()
        .map(|(id, name)| ChecklistEntry::checkbox(name, selection.is_checked(id)))
        .collect();
    entries.push(ChecklistEntry::button(CONTINUE_LABEL).enabled(gate.is_open()));

    let warning = format!("Tam olarak {REQUIRED_ITEMS} eşya seçmelisin ({} seçili).", gate.selected);
    render_checklist(
        frame,
        app,
        area,
        "Issız Ada",
        "Bir hata yüzünden simülasyonun içine düştün ve bir adada mahsur kaldın. Yanına hangi 3 eşyayı alırsın?",
        &entries,
        gate.shows_warning().then_some(warning.as_str()),
    );
}

fn render_person(frame: &mut Frame, app: &App, area: Rect) {
    let choices = app.session.choices();
    let selected = choices.selected_person();

    let mut entries: Vec<ChecklistEntry> = choices
        .catalog()
        .people()
        .map(|(id, name)| ChecklistEntry::radio(name, selected == Some(id)))
        .collect();
    entries.push(ChecklistEntry::button(CONTINUE_LABEL).enabled(choices.person_gate().is_open()));

    render_checklist(
        frame,
        app,
        area,
        "Issız Ada",
        "Adaya yanında kimin gelmesini isterdin?",
        &entries,
        None,
    );
}

fn render_dilemma(frame: &mut Frame, app: &App, area: Rect) {
    let entries = [
        ChecklistEntry::button(ESCAPE_LABEL),
        ChecklistEntry::button(STAY_LABEL),
    ];
    let prompt = &app.session.stage().dilemma_question;
    render_checklist(frame, app, area, "İkilem", prompt, &entries, None);
}

fn render_escapees(frame: &mut Frame, app: &App, area: Rect) {
    let choices = app.session.choices();
    let catalog = choices.catalog();
    let Some(selection) = choices.escapee_selection() else {
        return;
    };
    let gate = selection.gate();

    let mut entries: Vec<ChecklistEntry> = selection
        .options()
        .iter()
        .map(|id| ChecklistEntry::checkbox(catalog.person_name(*id), selection.is_checked(*id)))
        .collect();
    entries.push(ChecklistEntry::button(CONTINUE_LABEL).enabled(gate.is_open()));

    let warning = format!("Tam olarak {REQUIRED_ESCAPEES} kişi seçmelisin ({} seçili).", gate.selected);
    render_checklist(
        frame,
        app,
        area,
        "Kaçış",
        "Kaçarken yanına alacağın 2 kişiyi seç:",
        &entries,
        gate.shows_warning().then_some(warning.as_str()),
    );
}

fn render_plans(frame: &mut Frame, app: &App, area: Rect) {
    let entries: Vec<ChecklistEntry> = Plan::all()
        .iter()
        .enumerate()
        .map(|(i, plan)| ChecklistEntry::button(format!("{}. {}", i + 1, plan.label())))
        .collect();
    let prompt = &app.session.stage().activity_question;
    render_checklist(frame, app, area, "Plan", prompt, &entries, None);
}

fn render_final_story(frame: &mut Frame, app: &App, area: Rect) {
    let [story_area, button_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let story = app.session.stage().story.as_deref().unwrap_or_default();
    let widget = StoryWidget::new(story, &app.theme)
        .title("Hikaye")
        .scroll(app.scroll);
    frame.render_widget(widget, story_area);
    render_button(frame, app, button_area, ENVELOPE_LABEL);
}

fn render_letter(frame: &mut Frame, app: &App, area: Rect) {
    let [letter_area, button_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let letter = letter_text(app);
    let widget = StoryWidget::new(&letter, &app.theme)
        .title("Mektup")
        .letter()
        .scroll(app.scroll);
    frame.render_widget(widget, letter_area);
    render_button(frame, app, button_area, VIDEO_LABEL);
}

fn letter_text(app: &App) -> String {
    let honoree = &app.session.config().honoree;
    format!(
        "Sevgili {name},\n\n{age} yaşın kutlu olsun! Bu küçük simülasyonu senin için hazırladık. Seçtiğin eşyalar, yanına aldığın insanlar ve verdiğin kararlar tam da sana yakışır şekildeydi.\n\nNice mutlu, maceralı ve bol kahkahalı yıllara.\n\n{date}",
        name = honoree.name,
        age = honoree.age,
        date = honoree.date,
    )
}

fn render_button(frame: &mut Frame, app: &App, area: Rect, label: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(false));
    let button = Paragraph::new(Span::styled(
        format!("> [ {label} ]"),
        app.theme.entry_style(true, true),
    ))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(button, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.scene() {
        SceneId::Start => "Enter başla · q çık",
        SceneId::Photos => "q çık",
        SceneId::FinalStory => "Enter zarfı aç · j/k kaydır · q çık",
        SceneId::Letter if app.session.stage().video.open => "x/Esc kapat · v tekrar oynat",
        SceneId::Letter => "v video · j/k kaydır · q/Esc çık",
        SceneId::ActivityPlan => "j/k seç · 1-5 plan · q çık",
        _ => "j/k seç · Enter/Space işaretle · q çık",
    };

    let mut spans = vec![Span::styled(format!(" {} ", app.scene().element_id()), app.theme.title_style())];
    match app.status() {
        Some(status) => spans.push(Span::styled(status, app.theme.warning_style())),
        None => spans.push(Span::styled(hints, app.theme.status_style())),
    }

    let paragraph = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
