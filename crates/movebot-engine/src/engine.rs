use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use movebot_core::config::PricingConfig;
use movebot_core::types::{
    Button, Extra, GeoPoint, InputMediaItem, Language, Stop, TimeWindow, VolumeCategory,
};
use movebot_pricing::catalog::Catalog;
use movebot_pricing::estimate::{compute_estimate, EstimateInput};
use movebot_pricing::extract::extract_items;
use movebot_pricing::route::{classify_route, find_locality, locality_by_key};
use movebot_pricing::volume::{has_room_descriptor, infer_volume, infer_volume_from_rooms};
use movebot_sessions::types::{SessionState, Step};

use crate::dates::{parse_date, parse_time, DateReject};
use crate::i18n::{button, t, Msg};
use crate::intent::{self, Intent};
use crate::language::detect_language;
use crate::prefill::LandingPrefill;

/// One normalized inbound event, as the ingress hands it to the engine.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Text(String),
    Button(String),
    Location(GeoPoint),
    Media(Vec<InputMediaItem>),
}

/// The outbound reply produced by one engine step.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub buttons: Vec<Button>,
}

impl Reply {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    fn with_buttons(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            buttons,
        }
    }
}

/// Side effects the ingress must perform after persisting the session.
/// The engine itself does no I/O.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Persist the lead, enqueue the notification jobs, delete the session.
    FinalizeLead,
    /// Enqueue media ingestion for these attachments.
    CollectMedia(Vec<InputMediaItem>),
}

/// Result of one engine step.
#[derive(Debug)]
pub struct StepOutcome {
    pub session: SessionState,
    pub reply: Reply,
    pub effects: Vec<Effect>,
    pub terminal: bool,
}

/// Per-request engine context: the clock and resolved display toggles.
#[derive(Debug, Clone, Copy)]
pub struct EngineContext {
    pub today: NaiveDate,
    pub estimate_display_enabled: bool,
}

static FLOOR_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d{1,2}").unwrap());

/// The deterministic intake state machine.
///
/// `step` is a pure function over `(SessionState, InputEvent, EngineContext)`
/// — store writes, job enqueues and deletions are described by the returned
/// effects and performed by the caller.
pub struct Engine {
    pricing: PricingConfig,
    catalog: Catalog,
}

impl Engine {
    pub fn new(pricing: PricingConfig) -> Self {
        let catalog = Catalog::from_config(&pricing);
        Self { pricing, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Advance the conversation by one inbound event.
    pub fn step(&self, session: &SessionState, event: &InputEvent, ctx: &EngineContext) -> StepOutcome {
        let mut s = session.clone();

        // Language may switch on free text only; buttons, locations and
        // media never change it.
        if let InputEvent::Text(text) = event {
            if let Some(detected) = detect_language(text) {
                if detected != s.language {
                    debug!(from = %s.language, to = %detected, "language switched");
                    s.language = detected;
                }
            }
        }

        let intent = match event {
            InputEvent::Text(text) => intent::from_text(s.language, text),
            InputEvent::Button(payload) => intent::from_payload(payload),
            _ => None,
        };

        // Reset rebuilds the session and behaves like a first contact.
        if intent == Some(Intent::Reset) {
            let mut fresh = s.reset();
            fresh.step = Step::Cargo;
            let reply = Reply::new(t(fresh.language, Msg::Welcome));
            return StepOutcome {
                session: fresh,
                reply,
                effects: Vec::new(),
                terminal: false,
            };
        }

        let lang = s.language;
        let (reply, effects, terminal) = match s.step {
            Step::Welcome => self.on_welcome(&mut s, event),
            Step::ConfirmAddresses => self.on_confirm_addresses(&mut s, intent),
            Step::Cargo => self.on_cargo(&mut s, event),
            Step::Volume => self.on_volume(&mut s, event),
            Step::PickupCount => self.on_pickup_count(&mut s, event),
            Step::AddrFrom | Step::AddrFrom2 | Step::AddrFrom3 => self.on_address(&mut s, event),
            Step::AddrTo => self.on_address(&mut s, event),
            Step::FloorFrom | Step::FloorFrom2 | Step::FloorFrom3 | Step::FloorTo => {
                self.on_floor(&mut s, event)
            }
            Step::Date => self.on_date(&mut s, event, ctx),
            Step::SpecificDate => self.on_specific_date(&mut s, event, ctx),
            Step::TimeSlot => self.on_time_slot(&mut s, event, ctx),
            Step::ExactTime => self.on_exact_time(&mut s, event, ctx),
            Step::PhotoMenu => self.on_photo_menu(&mut s, event),
            Step::PhotoWait => self.on_photo_wait(&mut s, event, intent),
            Step::Extras => self.on_extras(&mut s, event, ctx),
            Step::Estimate => self.on_estimate(&mut s, intent),
            // A deleted-session race: answer politely, change nothing.
            Step::Done => ((Reply::new(t(lang, Msg::DoneThanks)), Vec::new(), false)),
        };

        StepOutcome {
            session: s,
            reply,
            effects,
            terminal,
        }
    }

    // ── step handlers ────────────────────────────────────────────────────────

    fn on_welcome(&self, s: &mut SessionState, event: &InputEvent) -> Handled {
        if let InputEvent::Text(text) = event {
            if let Some(prefill) = LandingPrefill::parse(text) {
                self.apply_prefill(s, &prefill);
                s.step = Step::ConfirmAddresses;
                let summary = self.prefill_summary(s);
                return (
                    Reply::with_buttons(
                        summary,
                        vec![button(s.language, "yes"), button(s.language, "no")],
                    ),
                    Vec::new(),
                    false,
                );
            }
        }
        s.step = Step::Cargo;
        (Reply::new(t(s.language, Msg::Welcome)), Vec::new(), false)
    }

    fn on_confirm_addresses(&self, s: &mut SessionState, intent: Option<Intent>) -> Handled {
        match intent {
            Some(Intent::Yes) => {
                if s.data.pickups.is_empty() {
                    s.step = Step::PickupCount;
                    (self.ask_pickup_count(s), Vec::new(), false)
                } else {
                    s.step = Step::FloorFrom;
                    (self.ask_floor(s), Vec::new(), false)
                }
            }
            Some(Intent::No) => {
                // Drop the prefill but keep identity and language.
                s.data = Default::default();
                s.step = Step::Cargo;
                (Reply::new(t(s.language, Msg::AskCargo)), Vec::new(), false)
            }
            _ => (
                Reply::with_buttons(
                    t(s.language, Msg::ConfirmAddresses),
                    vec![button(s.language, "yes"), button(s.language, "no")],
                ),
                Vec::new(),
                false,
            ),
        }
    }

    fn on_cargo(&self, s: &mut SessionState, event: &InputEvent) -> Handled {
        let InputEvent::Text(text) = event else {
            return (Reply::new(t(s.language, Msg::AskCargo)), Vec::new(), false);
        };

        s.data.cargo_raw = text.clone();
        let items = extract_items(&self.catalog, text);
        let room = has_room_descriptor(text);

        if !items.is_empty() || room {
            s.data.volume_category = infer_volume(&self.pricing, &items)
                .or_else(|| infer_volume_from_rooms(text));
            s.data.items = items;
            s.step = Step::PickupCount;
            (self.ask_pickup_count(s), Vec::new(), false)
        } else {
            s.data.items.clear();
            s.step = Step::Volume;
            (self.ask_volume(s), Vec::new(), false)
        }
    }

    fn on_volume(&self, s: &mut SessionState, event: &InputEvent) -> Handled {
        let choice = event_token(event);
        let volume = match choice.as_deref() {
            Some("small") => Some(VolumeCategory::Small),
            Some("medium") => Some(VolumeCategory::Medium),
            Some("large") => Some(VolumeCategory::Large),
            Some("xl") => Some(VolumeCategory::Xl),
            _ => None,
        };
        match volume {
            Some(v) => {
                s.data.volume_category = Some(v);
                s.step = Step::PickupCount;
                (self.ask_pickup_count(s), Vec::new(), false)
            }
            None => (
                Reply::with_buttons(
                    t(s.language, Msg::HintVolume),
                    volume_buttons(s.language),
                ),
                Vec::new(),
                false,
            ),
        }
    }

    fn on_pickup_count(&self, s: &mut SessionState, event: &InputEvent) -> Handled {
        let count = event_token(event).and_then(|t| t.parse::<u8>().ok());
        match count {
            Some(n @ 1..=3) => {
                s.data.pickup_count = n;
                s.data.pickups.clear();
                s.step = Step::AddrFrom;
                (Reply::new(t(s.language, Msg::AskAddrFrom)), Vec::new(), false)
            }
            _ => (
                Reply::with_buttons(
                    t(s.language, Msg::HintPickupCount),
                    count_buttons(),
                ),
                Vec::new(),
                false,
            ),
        }
    }

    fn on_address(&self, s: &mut SessionState, event: &InputEvent) -> Handled {
        let stop = match event {
            InputEvent::Text(text) if !text.trim().is_empty() => Stop {
                address_text: text.trim().to_string(),
                floor_num: 0,
                has_elevator: false,
                locality_key: find_locality(text).map(|l| l.key.to_string()),
                geo: None,
            },
            InputEvent::Location(geo) => Stop {
                address_text: format!("({:.5}, {:.5})", geo.lat, geo.lng),
                floor_num: 0,
                has_elevator: false,
                locality_key: None,
                geo: Some(*geo),
            },
            _ => {
                let msg = if s.step == Step::AddrTo {
                    Msg::AskAddrTo
                } else {
                    Msg::AskAddrFrom
                };
                return (Reply::new(t(s.language, msg)), Vec::new(), false);
            }
        };

        match s.step {
            Step::AddrFrom => {
                s.data.pickups = vec![stop];
                s.step = Step::FloorFrom;
            }
            Step::AddrFrom2 => {
                s.data.pickups.truncate(1);
                s.data.pickups.push(stop);
                s.step = Step::FloorFrom2;
            }
            Step::AddrFrom3 => {
                s.data.pickups.truncate(2);
                s.data.pickups.push(stop);
                s.step = Step::FloorFrom3;
            }
            _ => {
                s.data.destination = Some(stop);
                s.step = Step::FloorTo;
            }
        }
        (self.ask_floor(s), Vec::new(), false)
    }

    fn on_floor(&self, s: &mut SessionState, event: &InputEvent) -> Handled {
        let parsed = match event {
            InputEvent::Text(text) => parse_floor(text),
            InputEvent::Button(payload) => parse_floor(payload),
            _ => None,
        };
        let Some((floor, elevator)) = parsed else {
            return (Reply::new(t(s.language, Msg::HintFloor)), Vec::new(), false);
        };

        match s.step {
            Step::FloorFrom => {
                if let Some(stop) = s.data.pickups.get_mut(0) {
                    stop.floor_num = floor;
                    stop.has_elevator = elevator;
                }
                s.step = if s.data.pickup_count >= 2 {
                    Step::AddrFrom2
                } else {
                    self.after_pickups_step(s)
                };
            }
            Step::FloorFrom2 => {
                if let Some(stop) = s.data.pickups.get_mut(1) {
                    stop.floor_num = floor;
                    stop.has_elevator = elevator;
                }
                s.step = if s.data.pickup_count >= 3 {
                    Step::AddrFrom3
                } else {
                    self.after_pickups_step(s)
                };
            }
            Step::FloorFrom3 => {
                if let Some(stop) = s.data.pickups.get_mut(2) {
                    stop.floor_num = floor;
                    stop.has_elevator = elevator;
                }
                s.step = self.after_pickups_step(s);
            }
            _ => {
                if let Some(dest) = s.data.destination.as_mut() {
                    dest.floor_num = floor;
                    dest.has_elevator = elevator;
                }
                s.step = Step::Date;
            }
        }

        let reply = match s.step {
            Step::AddrFrom2 | Step::AddrFrom3 => {
                let n = if s.step == Step::AddrFrom2 { 2 } else { 3 };
                Reply::new(
                    t(s.language, Msg::AskAddrFromN).replace("{n}", &n.to_string()),
                )
            }
            Step::AddrTo => Reply::new(t(s.language, Msg::AskAddrTo)),
            Step::FloorTo => self.ask_floor(s),
            _ => Reply::with_buttons(t(s.language, Msg::AskDate), date_buttons(s.language)),
        };
        (reply, Vec::new(), false)
    }

    /// Where to go once every pickup has its floor: the destination address,
    /// unless a prefill already supplied it.
    fn after_pickups_step(&self, s: &SessionState) -> Step {
        if s.data.destination.is_some() {
            Step::FloorTo
        } else {
            Step::AddrTo
        }
    }

    fn on_date(&self, s: &mut SessionState, event: &InputEvent, ctx: &EngineContext) -> Handled {
        match event_token(event).as_deref() {
            Some("tomorrow") => {
                let date = ctx.today + chrono::Duration::days(1);
                s.data.date = Some(date.to_string());
                s.step = Step::TimeSlot;
                return (self.ask_time_slot(s), Vec::new(), false);
            }
            Some("this_week") => {
                s.data.date = Some("this_week".to_string());
                s.step = Step::TimeSlot;
                return (self.ask_time_slot(s), Vec::new(), false);
            }
            Some("specific") => {
                s.step = Step::SpecificDate;
                return (Reply::new(t(s.language, Msg::AskSpecificDate)), Vec::new(), false);
            }
            _ => {}
        }

        if let InputEvent::Text(text) = event {
            return self.commit_date(s, text, ctx);
        }
        (
            Reply::with_buttons(t(s.language, Msg::AskDate), date_buttons(s.language)),
            Vec::new(),
            false,
        )
    }

    fn on_specific_date(
        &self,
        s: &mut SessionState,
        event: &InputEvent,
        ctx: &EngineContext,
    ) -> Handled {
        if let InputEvent::Text(text) = event {
            return self.commit_date(s, text, ctx);
        }
        (Reply::new(t(s.language, Msg::AskSpecificDate)), Vec::new(), false)
    }

    fn commit_date(&self, s: &mut SessionState, text: &str, ctx: &EngineContext) -> Handled {
        match parse_date(text, s.language, ctx.today) {
            Ok(date) => {
                s.data.date = Some(date.to_string());
                s.step = Step::TimeSlot;
                (self.ask_time_slot(s), Vec::new(), false)
            }
            Err(reject) => {
                let msg = match reject {
                    DateReject::TooSoon => Msg::HintDateTooSoon,
                    DateReject::TooFar => Msg::HintDateTooFar,
                    DateReject::Unparsable => Msg::HintDateUnparsable,
                };
                (Reply::new(t(s.language, msg)), Vec::new(), false)
            }
        }
    }

    fn on_time_slot(&self, s: &mut SessionState, event: &InputEvent, _ctx: &EngineContext) -> Handled {
        let window = match event_token(event).as_deref() {
            Some("morning") => Some(TimeWindow::Morning),
            Some("day") => Some(TimeWindow::Day),
            Some("evening") => Some(TimeWindow::Evening),
            Some("exact") => {
                s.step = Step::ExactTime;
                return (Reply::new(t(s.language, Msg::AskExactTime)), Vec::new(), false);
            }
            _ => None,
        };
        match window {
            Some(w) => {
                s.data.time_window = Some(w);
                s.step = Step::PhotoMenu;
                (self.ask_photo_menu(s), Vec::new(), false)
            }
            None => (self.ask_time_slot(s), Vec::new(), false),
        }
    }

    fn on_exact_time(
        &self,
        s: &mut SessionState,
        event: &InputEvent,
        _ctx: &EngineContext,
    ) -> Handled {
        let parsed = match event {
            InputEvent::Text(text) => parse_time(text),
            _ => None,
        };
        match parsed {
            Some((h, m)) => {
                s.data.time_window = Some(TimeWindow::Exact);
                s.data.exact_time = Some(format!("{h:02}:{m:02}"));
                s.step = Step::PhotoMenu;
                (self.ask_photo_menu(s), Vec::new(), false)
            }
            None => (Reply::new(t(s.language, Msg::HintTimeUnparsable)), Vec::new(), false),
        }
    }

    fn on_photo_menu(&self, s: &mut SessionState, event: &InputEvent) -> Handled {
        match event {
            InputEvent::Media(items) => {
                s.step = Step::PhotoWait;
                (
                    Reply::with_buttons(
                        t(s.language, Msg::PhotoReceived),
                        vec![button(s.language, "done_photos")],
                    ),
                    vec![Effect::CollectMedia(items.clone())],
                    false,
                )
            }
            _ => match event_token(event).as_deref() {
                Some("upload") => {
                    s.step = Step::PhotoWait;
                    (
                        Reply::with_buttons(
                            t(s.language, Msg::PhotoWaitPrompt),
                            vec![button(s.language, "done_photos")],
                        ),
                        Vec::new(),
                        false,
                    )
                }
                Some("skip") => {
                    s.step = Step::Extras;
                    (self.ask_extras(s), Vec::new(), false)
                }
                _ => (self.ask_photo_menu(s), Vec::new(), false),
            },
        }
    }

    fn on_photo_wait(
        &self,
        s: &mut SessionState,
        event: &InputEvent,
        intent: Option<Intent>,
    ) -> Handled {
        if intent == Some(Intent::DonePhotos) {
            s.step = Step::Extras;
            return (self.ask_extras(s), Vec::new(), false);
        }
        match event {
            InputEvent::Media(items) => (
                Reply::with_buttons(
                    t(s.language, Msg::PhotoReceived),
                    vec![button(s.language, "done_photos")],
                ),
                vec![Effect::CollectMedia(items.clone())],
                false,
            ),
            _ => (
                Reply::with_buttons(
                    t(s.language, Msg::PhotoWaitPrompt),
                    vec![button(s.language, "done_photos")],
                ),
                Vec::new(),
                false,
            ),
        }
    }

    fn on_extras(&self, s: &mut SessionState, event: &InputEvent, ctx: &EngineContext) -> Handled {
        let toggled = match event_token(event).as_deref() {
            Some("movers") => Some(Extra::Movers),
            Some("assembly") => Some(Extra::Assembly),
            Some("packing") => Some(Extra::Packing),
            Some("extras_none") => {
                s.data.extras.clear();
                s.step = Step::Estimate;
                return (self.enter_estimate(s, ctx), Vec::new(), false);
            }
            Some("extras_done") => {
                s.step = Step::Estimate;
                return (self.enter_estimate(s, ctx), Vec::new(), false);
            }
            _ => None,
        };
        match toggled {
            Some(extra) => {
                if let Some(pos) = s.data.extras.iter().position(|e| *e == extra) {
                    s.data.extras.remove(pos);
                } else {
                    s.data.extras.push(extra);
                }
                (self.ask_extras(s), Vec::new(), false)
            }
            None => (self.ask_extras(s), Vec::new(), false),
        }
    }

    fn on_estimate(&self, s: &mut SessionState, intent: Option<Intent>) -> Handled {
        match intent {
            Some(Intent::Yes) => {
                s.step = Step::Done;
                (
                    Reply::new(t(s.language, Msg::DoneThanks)),
                    vec![Effect::FinalizeLead],
                    true,
                )
            }
            _ => (
                Reply::with_buttons(
                    t(s.language, Msg::HintEstimateChoice),
                    vec![button(s.language, "yes"), button(s.language, "reset")],
                ),
                Vec::new(),
                false,
            ),
        }
    }

    // ── reply builders ───────────────────────────────────────────────────────

    fn ask_volume(&self, s: &SessionState) -> Reply {
        Reply::with_buttons(t(s.language, Msg::AskVolume), volume_buttons(s.language))
    }

    fn ask_pickup_count(&self, s: &SessionState) -> Reply {
        Reply::with_buttons(t(s.language, Msg::AskPickupCount), count_buttons())
    }

    fn ask_floor(&self, s: &SessionState) -> Reply {
        Reply::new(t(s.language, Msg::AskFloor))
    }

    fn ask_time_slot(&self, s: &SessionState) -> Reply {
        Reply::with_buttons(
            t(s.language, Msg::AskTimeSlot),
            vec![
                button(s.language, "morning"),
                button(s.language, "day"),
                button(s.language, "evening"),
                button(s.language, "exact"),
            ],
        )
    }

    fn ask_photo_menu(&self, s: &SessionState) -> Reply {
        Reply::with_buttons(
            t(s.language, Msg::AskPhotoMenu),
            vec![button(s.language, "upload"), button(s.language, "skip")],
        )
    }

    fn ask_extras(&self, s: &SessionState) -> Reply {
        Reply::with_buttons(
            t(s.language, Msg::AskExtras),
            vec![
                button(s.language, "movers"),
                button(s.language, "assembly"),
                button(s.language, "packing"),
                button(s.language, "extras_none"),
                button(s.language, "extras_done"),
            ],
        )
    }

    /// Classify the route, compute and store the estimate, and render the
    /// estimate reply.
    fn enter_estimate(&self, s: &mut SessionState, ctx: &EngineContext) -> Reply {
        let from = s
            .data
            .pickups
            .first()
            .and_then(|p| p.locality_key.as_deref())
            .and_then(locality_by_key);
        let to = s
            .data
            .destination
            .as_ref()
            .and_then(|d| d.locality_key.as_deref())
            .and_then(locality_by_key);
        let route = classify_route(from, to);

        let estimate = compute_estimate(
            &self.pricing,
            &EstimateInput {
                items: &s.data.items,
                volume_category: s.data.volume_category,
                route: Some(&route),
                pickups: &s.data.pickups,
                destination: s.data.destination.as_ref(),
                extras: &s.data.extras,
                cargo_raw: &s.data.cargo_raw,
            },
        );

        s.data.route_classification = Some(route);
        let buttons = vec![button(s.language, "yes"), button(s.language, "reset")];
        let reply = if estimate.suppressed {
            Reply::with_buttons(t(s.language, Msg::EstimateSuppressed), buttons)
        } else if !ctx.estimate_display_enabled {
            Reply::with_buttons(t(s.language, Msg::EstimateHidden), buttons)
        } else {
            let text = t(s.language, Msg::EstimateRange)
                .replace("{min}", &estimate.min.to_string())
                .replace("{max}", &estimate.max.to_string())
                .replace("{currency}", &estimate.currency);
            Reply::with_buttons(text, buttons)
        };
        s.data.estimate = Some(estimate);
        reply
    }

    // ── prefill helpers ──────────────────────────────────────────────────────

    fn apply_prefill(&self, s: &mut SessionState, prefill: &LandingPrefill) {
        s.data = Default::default();
        s.data.set_prefilled(true);

        if let Some(from) = &prefill.from {
            s.data.pickups = vec![Stop {
                address_text: from.clone(),
                floor_num: 0,
                has_elevator: false,
                locality_key: find_locality(from).map(|l| l.key.to_string()),
                geo: None,
            }];
        }
        if let Some(to) = &prefill.to {
            s.data.destination = Some(Stop {
                address_text: to.clone(),
                floor_num: 0,
                has_elevator: false,
                locality_key: find_locality(to).map(|l| l.key.to_string()),
                geo: None,
            });
        }
        if !prefill.items.is_empty() {
            let raw = prefill.items.join(", ");
            s.data.items = extract_items(&self.catalog, &raw);
            s.data.cargo_raw = raw;
            s.data.volume_category = infer_volume(&self.pricing, &s.data.items);
        }
        if let Some(date) = &prefill.date {
            s.data.date = Some(date.clone());
        }
    }

    fn prefill_summary(&self, s: &SessionState) -> String {
        let mut lines = vec![t(s.language, Msg::ConfirmAddresses).to_string()];
        if let Some(p) = s.data.pickups.first() {
            lines.push(format!("→ {}", p.address_text));
        }
        if let Some(d) = &s.data.destination {
            lines.push(format!("→ {}", d.address_text));
        }
        if !s.data.cargo_raw.is_empty() {
            lines.push(format!("• {}", s.data.cargo_raw));
        }
        if let Some(date) = &s.data.date {
            lines.push(format!("• {date}"));
        }
        lines.join("\n")
    }
}

type Handled = (Reply, Vec<Effect>, bool);

/// The normalized token of a button press, or of a short text that names a
/// button payload (so typed "2" works like the "2" button).
fn event_token(event: &InputEvent) -> Option<String> {
    match event {
        InputEvent::Button(payload) => Some(payload.trim().to_lowercase()),
        InputEvent::Text(text) => {
            let trimmed = text.trim().to_lowercase();
            if trimmed.len() <= 12 && !trimmed.is_empty() {
                Some(trimmed)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Parse "floor + elevator" free text: a small number plus a yes/no or
/// elevator word in any of the three languages.
fn parse_floor(text: &str) -> Option<(i32, bool)> {
    let lower = text.to_lowercase();
    let floor: i32 = FLOOR_NUMBER.find(&lower)?.as_str().parse().ok()?;
    if !(0..=60).contains(&floor) {
        return None;
    }

    const NEGATIVE: [&str; 9] = [
        "без лифт", "нет лифт", "нет", "no elevator", "no lift", "no", "אין מעלית",
        "בלי מעלית", "לא",
    ];
    const POSITIVE: [&str; 9] = [
        "лифт", "есть", "да", "elevator", "lift", "yes", "מעלית", "יש", "כן",
    ];

    let has_negative = NEGATIVE.iter().any(|m| contains_word(&lower, m));
    if has_negative {
        return Some((floor, false));
    }
    let has_positive = POSITIVE.iter().any(|m| contains_word(&lower, m));
    if has_positive {
        return Some((floor, true));
    }
    None
}

/// Substring match that will not fire inside another word for short latin
/// tokens ("no" must not match inside "north").
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.len() > 3 || needle.contains(' ') {
        return haystack.contains(needle);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == needle)
}

fn volume_buttons(lang: Language) -> Vec<Button> {
    vec![
        button(lang, "small"),
        button(lang, "medium"),
        button(lang, "large"),
        button(lang, "xl"),
    ]
}

fn count_buttons() -> Vec<Button> {
    vec![
        Button::new("1", "1"),
        Button::new("2", "2"),
        Button::new("3", "3"),
    ]
}

fn date_buttons(lang: Language) -> Vec<Button> {
    vec![
        button(lang, "tomorrow"),
        button(lang, "this_week"),
        button(lang, "specific"),
    ]
}

/// Legal transitions out of each step, including skip edges. The reset
/// intent additionally maps every step to `cargo`.
pub fn successors(step: Step) -> &'static [Step] {
    match step {
        Step::Welcome => &[Step::ConfirmAddresses, Step::Cargo],
        Step::ConfirmAddresses => &[Step::FloorFrom, Step::PickupCount, Step::Cargo],
        Step::Cargo => &[Step::Volume, Step::PickupCount],
        Step::Volume => &[Step::PickupCount],
        Step::PickupCount => &[Step::AddrFrom],
        Step::AddrFrom => &[Step::FloorFrom],
        Step::FloorFrom => &[Step::AddrFrom2, Step::AddrTo, Step::FloorTo],
        Step::AddrFrom2 => &[Step::FloorFrom2],
        Step::FloorFrom2 => &[Step::AddrFrom3, Step::AddrTo, Step::FloorTo],
        Step::AddrFrom3 => &[Step::FloorFrom3],
        Step::FloorFrom3 => &[Step::AddrTo, Step::FloorTo],
        Step::AddrTo => &[Step::FloorTo],
        Step::FloorTo => &[Step::Date],
        Step::Date => &[Step::SpecificDate, Step::TimeSlot],
        Step::SpecificDate => &[Step::TimeSlot],
        Step::TimeSlot => &[Step::ExactTime, Step::PhotoMenu],
        Step::ExactTime => &[Step::PhotoMenu],
        Step::PhotoMenu => &[Step::PhotoWait, Step::Extras],
        Step::PhotoWait => &[Step::Extras],
        Step::Extras => &[Step::Estimate],
        Step::Estimate => &[Step::Done],
        Step::Done => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movebot_core::types::RouteBand;

    fn engine() -> Engine {
        Engine::new(PricingConfig::default())
    }

    fn ctx() -> EngineContext {
        EngineContext {
            today: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            estimate_display_enabled: true,
        }
    }

    fn text(s: &str) -> InputEvent {
        InputEvent::Text(s.to_string())
    }

    fn btn(s: &str) -> InputEvent {
        InputEvent::Button(s.to_string())
    }

    /// Drive one event and return the updated session.
    fn drive(engine: &Engine, session: SessionState, event: InputEvent) -> StepOutcome {
        engine.step(&session, &event, &ctx())
    }

    #[test]
    fn happy_path_russian_single_pickup() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");

        let out = drive(&e, s, text("Здравствуйте"));
        assert_eq!(out.session.language, Language::Ru);
        assert_eq!(out.session.step, Step::Cargo);
        s = out.session;

        let out = drive(&e, s, text("Холодильник, диван"));
        assert_eq!(out.session.step, Step::PickupCount, "volume step skipped");
        assert_eq!(out.session.data.items.len(), 2);
        assert_eq!(out.session.data.volume_category, Some(VolumeCategory::Small));
        s = out.session;

        let out = drive(&e, s, btn("1"));
        assert_eq!(out.session.step, Step::AddrFrom);
        s = out.session;

        let out = drive(&e, s, text("Хайфа, ул. Герцль 12, этаж 3, без лифта"));
        assert_eq!(out.session.step, Step::FloorFrom);
        assert_eq!(
            out.session.data.pickups[0].locality_key.as_deref(),
            Some("haifa")
        );
        s = out.session;

        let out = drive(&e, s, text("3 нет"));
        assert_eq!(out.session.step, Step::AddrTo);
        assert_eq!(out.session.data.pickups[0].floor_num, 3);
        assert!(!out.session.data.pickups[0].has_elevator);
        s = out.session;

        let out = drive(&e, s, text("Тель-Авив, ул. Алленби 5"));
        assert_eq!(out.session.step, Step::FloorTo);
        s = out.session;

        let out = drive(&e, s, text("2 лифт"));
        assert_eq!(out.session.step, Step::Date);
        let dest = out.session.data.destination.clone().expect("no destination");
        assert_eq!(dest.floor_num, 2);
        assert!(dest.has_elevator);
        s = out.session;

        let out = drive(&e, s, btn("tomorrow"));
        assert_eq!(out.session.step, Step::TimeSlot);
        assert_eq!(out.session.data.date.as_deref(), Some("2026-08-02"));
        s = out.session;

        let out = drive(&e, s, btn("morning"));
        assert_eq!(out.session.step, Step::PhotoMenu);
        s = out.session;

        let out = drive(&e, s, btn("skip"));
        assert_eq!(out.session.step, Step::Extras);
        s = out.session;

        let out = drive(&e, s, btn("extras_none"));
        assert_eq!(out.session.step, Step::Estimate);
        let estimate = out.session.data.estimate.clone().expect("no estimate");
        assert!(!estimate.suppressed);
        assert!(estimate.min >= PricingConfig::default().min_same_metro);
        assert!(estimate.breakdown.iter().any(|b| b.label.contains("fridge")));
        assert!(estimate.breakdown.iter().any(|b| b.label.contains("sofa")));
        let route = out.session.data.route_classification.clone().expect("no route");
        assert_eq!(route.band, RouteBand::InterRegionShort);
        assert!(out.reply.text.contains(&estimate.min.to_string()));
        s = out.session;

        let out = drive(&e, s, btn("yes"));
        assert!(out.terminal);
        assert_eq!(out.session.step, Step::Done);
        assert!(matches!(out.effects[..], [Effect::FinalizeLead]));
    }

    #[test]
    fn unrecognized_cargo_asks_volume() {
        let e = engine();
        let s = SessionState::new("t1", "c1");
        let s = drive(&e, s, text("hello")).session;
        let out = drive(&e, s, text("stuff"));
        assert_eq!(out.session.step, Step::Volume);
        let out = drive(&e, out.session, btn("large"));
        assert_eq!(out.session.step, Step::PickupCount);
        assert_eq!(out.session.data.volume_category, Some(VolumeCategory::Large));
    }

    #[test]
    fn room_descriptor_skips_volume() {
        let e = engine();
        let s = SessionState::new("t1", "c1");
        let s = drive(&e, s, text("привет")).session;
        let out = drive(&e, s, text("3-комнатная квартира"));
        assert_eq!(out.session.step, Step::PickupCount);
        assert_eq!(out.session.data.volume_category, Some(VolumeCategory::Large));
    }

    #[test]
    fn invalid_pickup_count_reenters_with_hint() {
        let e = engine();
        let s = SessionState::new("t1", "c1");
        let s = drive(&e, s, text("hi")).session;
        let s = drive(&e, s, text("sofa")).session;
        assert_eq!(s.step, Step::PickupCount);
        let out = drive(&e, s.clone(), text("7"));
        assert_eq!(out.session.step, Step::PickupCount, "state unchanged");
        assert_eq!(out.session.data.pickup_count, s.data.pickup_count);
        assert!(!out.reply.buttons.is_empty());
    }

    #[test]
    fn date_boundaries() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::Date;
        s.language = Language::En;

        // today accepted
        let out = drive(&e, s.clone(), text("2026-08-01"));
        assert_eq!(out.session.step, Step::TimeSlot);
        // yesterday rejected, step unchanged
        let out = drive(&e, s.clone(), text("2026-07-31"));
        assert_eq!(out.session.step, Step::Date);
        assert_eq!(out.reply.text, t(Language::En, Msg::HintDateTooSoon));
        // +180 accepted
        let out = drive(&e, s.clone(), text("2027-01-28"));
        assert_eq!(out.session.step, Step::TimeSlot);
        // +181 rejected
        let out = drive(&e, s.clone(), text("2027-01-29"));
        assert_eq!(out.session.step, Step::Date);
        assert_eq!(out.reply.text, t(Language::En, Msg::HintDateTooFar));
    }

    #[test]
    fn exact_time_flow() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::TimeSlot;
        let out = drive(&e, s, btn("exact"));
        assert_eq!(out.session.step, Step::ExactTime);
        let out = drive(&e, out.session, text("09:30"));
        assert_eq!(out.session.step, Step::PhotoMenu);
        assert_eq!(out.session.data.time_window, Some(TimeWindow::Exact));
        assert_eq!(out.session.data.exact_time.as_deref(), Some("09:30"));
    }

    #[test]
    fn photo_wait_loops_until_done() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::PhotoMenu;
        let out = drive(&e, s, btn("upload"));
        assert_eq!(out.session.step, Step::PhotoWait);

        let media = InputEvent::Media(vec![InputMediaItem {
            content_type: "image/jpeg".to_string(),
            size_bytes: 1000,
            source_ref: "file-1".to_string(),
        }]);
        let out = drive(&e, out.session, media);
        assert_eq!(out.session.step, Step::PhotoWait, "loops on media");
        assert!(matches!(out.effects[..], [Effect::CollectMedia(_)]));

        let out = drive(&e, out.session, btn("done_photos"));
        assert_eq!(out.session.step, Step::Extras);
    }

    #[test]
    fn extras_toggle_and_continue() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::Extras;
        let out = drive(&e, s, btn("assembly"));
        assert_eq!(out.session.data.extras, vec![Extra::Assembly]);
        // Second press removes it.
        let out = drive(&e, out.session, btn("assembly"));
        assert!(out.session.data.extras.is_empty());
        let out = drive(&e, out.session, btn("packing"));
        let out = drive(&e, out.session, btn("extras_done"));
        assert_eq!(out.session.step, Step::Estimate);
        assert_eq!(out.session.data.extras, vec![Extra::Packing]);
    }

    #[test]
    fn reset_is_equivalent_to_fresh_start() {
        let e = engine();
        let s = SessionState::new("t1", "c1");
        let s = drive(&e, s, text("Здравствуйте")).session;
        let s = drive(&e, s, text("Холодильник, диван")).session;
        let s = drive(&e, s, btn("1")).session;
        assert_eq!(s.language, Language::Ru);

        let after_reset = drive(&e, s, btn("reset"));
        let fresh = {
            let mut f = SessionState::new("t1", "c1");
            f.language = Language::Ru;
            drive(&e, f, text("Здравствуйте")).session
        };

        let r = &after_reset.session;
        assert_eq!(r.step, fresh.step);
        assert_eq!(r.language, Language::Ru);
        assert!(r.data.items.is_empty());
        assert!(r.data.pickups.is_empty());
        assert_eq!(after_reset.reply.text, t(Language::Ru, Msg::Welcome));
    }

    #[test]
    fn reset_works_from_text_in_any_language() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::Extras;
        s.language = Language::Ru;
        let out = drive(&e, s, text("сброс"));
        assert_eq!(out.session.step, Step::Cargo);
        assert_eq!(out.session.language, Language::Ru);
    }

    #[test]
    fn button_payload_never_switches_language() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.language = Language::Ru;
        s.step = Step::PhotoMenu;
        // "skip" is latin text but arrives as a button — language must stay.
        let out = drive(&e, s, btn("skip"));
        assert_eq!(out.session.language, Language::Ru);
    }

    #[test]
    fn free_text_switches_language_mid_conversation() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.language = Language::Ru;
        s.step = Step::Cargo;
        let out = drive(&e, s, text("sofa and fridge"));
        assert_eq!(out.session.language, Language::En);
    }

    #[test]
    fn landing_prefill_enters_confirm_and_skips_cargo() {
        let e = engine();
        let s = SessionState::new("t1", "c1");
        let out = drive(
            &e,
            s,
            text("#lead from=Haifa;to=Tel Aviv;items=sofa,fridge"),
        );
        assert_eq!(out.session.step, Step::ConfirmAddresses);
        assert!(out.session.data.is_prefilled());
        assert_eq!(out.session.data.items.len(), 2);

        // Accept: cargo inference is skipped, floors are still collected.
        let out = drive(&e, out.session, btn("yes"));
        assert_eq!(out.session.step, Step::FloorFrom);

        let out = drive(&e, out.session, text("2 yes"));
        assert_eq!(out.session.step, Step::FloorTo, "destination prefilled, addr_to skipped");
        let out = drive(&e, out.session, text("1 yes"));
        assert_eq!(out.session.step, Step::Date);
    }

    #[test]
    fn landing_prefill_rejection_falls_back_to_cargo() {
        let e = engine();
        let s = SessionState::new("t1", "c1");
        let out = drive(&e, s, text("#lead from=Haifa;to=Eilat"));
        let out = drive(&e, out.session, btn("no"));
        assert_eq!(out.session.step, Step::Cargo);
        assert!(out.session.data.pickups.is_empty());
        assert!(!out.session.data.is_prefilled());
    }

    #[test]
    fn suppressed_estimate_message() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.language = Language::Ru;
        s.step = Step::Extras;
        s.data.cargo_raw = "очень много разных непонятных вещей из гаража".to_string();
        let out = drive(&e, s, btn("extras_none"));
        let estimate = out.session.data.estimate.clone().expect("no estimate");
        assert!(estimate.suppressed);
        assert_eq!(out.reply.text, t(Language::Ru, Msg::EstimateSuppressed));
        // Breakdown persisted even though the range is hidden from the user.
        assert!(!out.reply.text.contains(&estimate.min.to_string()));
    }

    #[test]
    fn hidden_estimate_when_display_disabled() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::Extras;
        s.data.items = extract_items(e.catalog(), "sofa");
        s.data.volume_category = Some(VolumeCategory::Small);
        let context = EngineContext {
            today: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            estimate_display_enabled: false,
        };
        let out = e.step(&s, &btn("extras_done"), &context);
        assert_eq!(out.reply.text, t(Language::En, Msg::EstimateHidden));
        assert!(out.session.data.estimate.is_some());
    }

    #[test]
    fn two_pickups_collect_two_floor_pairs() {
        let e = engine();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::PickupCount;
        let out = drive(&e, s, btn("2"));
        assert_eq!(out.session.step, Step::AddrFrom);
        let out = drive(&e, out.session, text("Haifa, Herzl 1"));
        let out = drive(&e, out.session, text("6 no"));
        assert_eq!(out.session.step, Step::AddrFrom2);
        let out = drive(&e, out.session, text("Haifa, Hanamal 2"));
        assert_eq!(out.session.step, Step::FloorFrom2);
        let out = drive(&e, out.session, text("1 yes"));
        assert_eq!(out.session.step, Step::AddrTo);
        assert_eq!(out.session.data.pickups.len(), 2);
        assert_eq!(out.session.data.pickups[0].floor_num, 6);
        assert!(!out.session.data.pickups[0].has_elevator);
    }

    #[test]
    fn every_transition_stays_in_vocabulary() {
        // Reachability property: for a battery of events fired at every
        // step, the resulting step is the same step, a legal successor, or
        // the reset target.
        let e = engine();
        let events = [
            text("Здравствуйте"),
            text("диван, холодильник"),
            text("3-комнатная квартира"),
            text("2026-09-01"),
            text("3 no"),
            text("09:30"),
            text("#lead from=Haifa;to=Tel Aviv"),
            btn("1"),
            btn("yes"),
            btn("no"),
            btn("reset"),
            btn("tomorrow"),
            btn("morning"),
            btn("exact"),
            btn("upload"),
            btn("skip"),
            btn("done_photos"),
            btn("assembly"),
            btn("extras_done"),
            btn("extras_none"),
            btn("small"),
            InputEvent::Location(GeoPoint { lat: 32.08, lng: 34.78 }),
            InputEvent::Media(vec![InputMediaItem {
                content_type: "image/jpeg".to_string(),
                size_bytes: 10,
                source_ref: "f".to_string(),
            }]),
        ];

        for step in Step::ALL {
            for event in &events {
                let mut s = SessionState::new("t1", "c1");
                s.step = step;
                // Give floor/addr handlers something to mutate.
                s.data.pickup_count = 2;
                s.data.pickups = vec![
                    Stop {
                        address_text: "a".to_string(),
                        floor_num: 0,
                        has_elevator: false,
                        locality_key: None,
                        geo: None,
                    },
                    Stop {
                        address_text: "b".to_string(),
                        floor_num: 0,
                        has_elevator: false,
                        locality_key: None,
                        geo: None,
                    },
                ];
                let out = e.step(&s, event, &ctx());
                let next = out.session.step;
                let legal = next == step
                    || successors(step).contains(&next)
                    || next == Step::Cargo; // reset target
                assert!(
                    legal,
                    "illegal transition {step} -> {next} on {event:?}"
                );
            }
        }
    }
}
