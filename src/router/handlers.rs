//! Handlers behind the rule table

use super::extract;
use super::{Action, Matched, Response, Router, SideEffect};
use crate::error::{LookupError, MemoryError};
use crate::launcher::Resolution;
use crate::monitor::{self, NetworkTotals};
use crate::responses::{ResponseSet, HELP_TEXT};
use crate::session::SessionState;
use chrono::{Duration, Local, NaiveDateTime};
use tracing::{error, warn};

/// Phrases translated without the AI: (phrase, language, translation)
const PHRASEBOOK: &[(&str, &str, &str)] = &[
    ("hello", "spanish", "hola"),
    ("hello", "french", "bonjour"),
    ("hello", "german", "hallo"),
    ("goodbye", "spanish", "adiós"),
    ("goodbye", "french", "au revoir"),
    ("goodbye", "german", "auf wiedersehen"),
    ("thank you", "spanish", "gracias"),
    ("thank you", "french", "merci"),
    ("thank you", "german", "danke"),
];

fn phrasebook(text: &str, language: &str) -> Option<&'static str> {
    let text = text.trim().to_lowercase();
    let language = language.trim().to_lowercase();
    PHRASEBOOK
        .iter()
        .find(|(phrase, lang, _)| *phrase == text && *lang == language)
        .map(|(_, _, translation)| *translation)
}

/// "yesterday" / "tomorrow" relative to `now`
fn relative_date(text: &str, now: NaiveDateTime, user: &str) -> Option<String> {
    let day = |offset: i64| (now + Duration::days(offset)).format("%A, %B %d, %Y").to_string();
    if text.contains("yesterday") {
        Some(format!("Yesterday was {}, {}", day(-1), user))
    } else if text.contains("tomorrow") {
        Some(format!("Tomorrow will be {}, {}", day(1), user))
    } else {
        None
    }
}

fn relative_time(hours: i64, now: NaiveDateTime, user: &str) -> String {
    let then = (now + Duration::hours(hours)).format("%H:%M");
    let unit = if hours.abs() == 1 { "hour" } else { "hours" };
    if hours < 0 {
        format!("{} {} ago it was {}, {}", -hours, unit, then, user)
    } else {
        format!("In {} {} it will be {}, {}", hours, unit, then, user)
    }
}

fn count(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

impl Router {
    pub(crate) async fn handle(&mut self, m: Matched<'_>, state: &SessionState) -> Response {
        let user = state.user_name.as_str();
        match m.action {
            Action::Terminate => Response::say(
                self.responses
                    .pick(ResponseSet::Farewell, &[("user", user)]),
            )
            .with_effect(SideEffect::Terminate),

            Action::SetName => self.set_name(m.raw_arg),
            Action::RememberFact => self.remember_fact(m.arg),
            Action::RecallFact => self.recall_fact(m.arg),
            Action::CreateList => self.create_list(m.arg),
            Action::AppendList => self.append_list(m.arg),
            Action::ShowList => self.show_list(m.arg),
            Action::CreateDict => self.create_dict(m.arg),
            Action::PutDictEntry => self.put_dict_entry(m.arg),
            Action::ShowDict => self.show_dict(m.arg),

            Action::Wikipedia => self.wikipedia(m.raw_arg).await,
            Action::WebSearch => self.search(m.raw_arg),
            Action::VideoSearch => self.video_search(m.raw_arg),
            Action::Translate => self.translate(m.arg).await,
            Action::ListApps => self.list_apps(),
            Action::Diagnostics => self.diagnostics(state).await,
            Action::Weather => self.weather(m.raw_arg).await,
            Action::SystemInfo => Response::say(format!(
                "System information: {}",
                self.monitor.system_info().join(". ")
            )),
            Action::CpuUsage => Response::say(format!(
                "Current CPU usage: {:.1}%",
                self.monitor.snapshot().cpu_percent
            )),
            Action::MemoryUsage => {
                let snap = self.monitor.snapshot();
                Response::say(format!(
                    "Memory usage: {:.1}% (Used: {:.2}GB, Available: {:.2}GB)",
                    snap.memory_percent, snap.memory_used_gb, snap.memory_available_gb
                ))
            }
            Action::IpAddress => match monitor::local_ip(&self.diagnostics_probe).await {
                Some(ip) => Response::say(format!("Your IP address is {}", ip)),
                None => Response::say("Unable to determine IP address"),
            },
            Action::NetworkStats => Response::say(NetworkTotals::read().describe()),
            Action::RelativeTime => match extract::relative_hours(m.arg) {
                Some(hours) => Response::say(relative_time(hours, Local::now().naive_local(), user)),
                None => Response::say(
                    "Please specify hours clearly, for example 'what time was it 3 hours ago'.",
                ),
            },
            Action::RelativeDate => {
                let now = Local::now().naive_local();
                match relative_date(m.arg, now, user) {
                    Some(text) => Response::say(text),
                    None => Response::say(format!(
                        "Today is {}, {}",
                        now.format("%A, %B %d, %Y"),
                        user
                    )),
                }
            }
            Action::Time => match extract::relative_hours(m.arg) {
                Some(hours) => Response::say(relative_time(hours, Local::now().naive_local(), user)),
                None => {
                    let time = Local::now().format("%H:%M:%S").to_string();
                    Response::say(
                        self.responses.pick(ResponseSet::Time, &[("time", time.as_str())]),
                    )
                }
            },
            Action::Date => {
                let date = Local::now().format("%A, %B %d, %Y").to_string();
                Response::say(self.responses.pick(ResponseSet::Date, &[("date", date.as_str())]))
            }
            Action::LaunchApp => self.launch(m.arg),

            Action::Greeting => Response::say(self.responses.greeting(user)),
            Action::Gratitude => {
                Response::say(self.responses.pick(ResponseSet::Gratitude, &[("user", user)]))
            }
            Action::Apology => {
                Response::say(self.responses.pick(ResponseSet::Apology, &[("user", user)]))
            }

            Action::Help => {
                Response::say("Here is what I can do.").with_detail(HELP_TEXT)
            }
            Action::Status => self.status(state),
            Action::Joke => Response::say(self.responses.pick(ResponseSet::Joke, &[])),
            Action::ToggleTheme => Response::say(format!(
                "Switched to {} theme",
                state.theme.toggled().name()
            ))
            .with_effect(SideEffect::ToggleTheme),
            // Wording depends on the outcome, which the coordinator owns
            Action::ToggleVoice => Response::say("").with_effect(SideEffect::ToggleVoice),
            Action::ClearTranscript => {
                Response::say("Chat history cleared").with_effect(SideEffect::ClearTranscript)
            }
            Action::ReconnectAi => {
                if self.ai.reconnect().await {
                    Response::say("AI systems back online.")
                } else {
                    Response::say("AI systems remain offline. Running in limited capacity.")
                }
            }
        }
    }

    fn memory_failure(&self, err: MemoryError) -> Response {
        match err {
            MemoryError::NotFound { kind, name } => {
                Response::say(format!("I couldn't find a {} named {}", kind, name))
            }
            other => {
                error!("❌ Memory write failed: {}", other);
                Response::say("I couldn't save that to my memory banks.")
            }
        }
    }

    fn set_name(&mut self, raw_name: &str) -> Response {
        let name = extract::display_name(raw_name);
        if name.is_empty() {
            return Response::say("What should I call you?");
        }
        match self.memory.set_fact("name", &name.to_lowercase()) {
            Ok(()) => Response::say(format!("Understood, I'll call you {} from now on.", name))
                .with_effect(SideEffect::RenameUser(name)),
            Err(e) => self.memory_failure(e),
        }
    }

    fn remember_fact(&mut self, text: &str) -> Response {
        let Some((key, value)) = extract::split_fact(text) else {
            return Response::say(
                "Please specify what to remember in the format: 'remember that [key] is [value]'",
            );
        };
        match self.memory.set_fact(key, value) {
            Ok(()) => Response::say(self.responses.pick(ResponseSet::Memory, &[]))
                .with_effect(SideEffect::Remembered),
            Err(e) => self.memory_failure(e),
        }
    }

    fn recall_fact(&self, key: &str) -> Response {
        let key = key.trim();
        if key.is_empty() {
            return Response::say("What would you like me to recall?");
        }
        match self.memory.get_fact(key) {
            Some(value) => Response::say(format!("Your {} is {}", key, value)),
            None => Response::say(format!("I don't have information about your {}", key)),
        }
    }

    fn create_list(&mut self, name: &str) -> Response {
        let name = extract::strip_possessive(name);
        if name.is_empty() {
            return Response::say("What should the list be called?");
        }
        match self.memory.create_list(name) {
            Ok(true) => Response::say(format!(
                "I've created a new list called {0}. You can add items by saying 'add [item] to {0} list'",
                name
            ))
            .with_effect(SideEffect::Remembered),
            Ok(false) => Response::say(format!("You already have a list called {}", name)),
            Err(e) => self.memory_failure(e),
        }
    }

    fn append_list(&mut self, text: &str) -> Response {
        let Some((item, list)) = extract::split_list_item(text) else {
            return Response::say(
                "Please use the format: 'add [item] to [list name] list'",
            );
        };
        match self.memory.append_to_list(list, item) {
            Ok(()) => Response::say(format!("Added {} to {}", item, list))
                .with_effect(SideEffect::Remembered),
            Err(e) => self.memory_failure(e),
        }
    }

    fn show_list(&self, name: &str) -> Response {
        let name = name.trim();
        match self.memory.list_contents(name) {
            Ok([]) => Response::say(format!("The {} list is currently empty", name)),
            Ok(items) => {
                let lines: Vec<String> = items.iter().map(|i| format!("- {}", i)).collect();
                Response::say(format!(
                    "Here's your {} list with {}",
                    name,
                    count(items.len(), "item", "items")
                ))
                .with_detail(format!("Contents of {} list:\n{}", name, lines.join("\n")))
            }
            Err(e) => self.memory_failure(e),
        }
    }

    fn create_dict(&mut self, name: &str) -> Response {
        let name = extract::strip_possessive(name);
        if name.is_empty() {
            return Response::say("What should the dictionary be called?");
        }
        match self.memory.create_dict(name) {
            Ok(true) => Response::say(format!(
                "I've created a new dictionary called {0}. You can add entries by saying 'add [key] is [value] to {0} dictionary'",
                name
            ))
            .with_effect(SideEffect::Remembered),
            Ok(false) => Response::say(format!("You already have a dictionary called {}", name)),
            Err(e) => self.memory_failure(e),
        }
    }

    fn put_dict_entry(&mut self, text: &str) -> Response {
        let Some((key, value, dict)) = extract::split_dict_entry(text) else {
            return Response::say(
                "Please use the format: 'add [key] is [value] to [dictionary name] dictionary'",
            );
        };
        match self.memory.put_entry(dict, key, value) {
            Ok(()) => Response::say(format!("Added {} as {} to {} dictionary", key, value, dict))
                .with_effect(SideEffect::Remembered),
            Err(e) => self.memory_failure(e),
        }
    }

    fn show_dict(&self, name: &str) -> Response {
        let name = name.trim();
        match self.memory.dict_contents(name) {
            Ok(entries) if entries.is_empty() => {
                Response::say(format!("The {} dictionary is currently empty", name))
            }
            Ok(entries) => {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("- {}: {}", k, v))
                    .collect();
                Response::say(format!(
                    "Here's your {} dictionary with {}",
                    name,
                    count(entries.len(), "entry", "entries")
                ))
                .with_detail(format!("Contents of {} dictionary:\n{}", name, lines.join("\n")))
            }
            Err(e) => self.memory_failure(e),
        }
    }

    async fn wikipedia(&self, topic: &str) -> Response {
        if topic.is_empty() {
            return Response::say("What should I look up on Wikipedia?");
        }
        match self.lookup.summary(topic).await {
            Ok(summary) => Response::say(format!("According to Wikipedia: {}", summary)),
            Err(LookupError::Ambiguous(title)) => Response::say(format!(
                "Multiple results found for {}. Please be more specific.",
                title
            )),
            Err(LookupError::NotFound(_)) => {
                Response::say("No Wikipedia page found for that query")
            }
            Err(e) => {
                warn!("⚠️ Wikipedia lookup failed: {}", e);
                Response::say("Unable to access Wikipedia at this time")
            }
        }
    }

    fn search(&mut self, query: &str) -> Response {
        if query.is_empty() {
            return Response::say("What would you like me to search for?");
        }
        let url = format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(query)
        );
        Response::say(self.responses.pick(ResponseSet::Search, &[("query", query)]))
            .with_effect(SideEffect::OpenUrl(url))
    }

    fn video_search(&self, query: &str) -> Response {
        if query.is_empty() {
            return Response::say("What should I search YouTube for?");
        }
        let url = format!(
            "https://www.youtube.com/results?search_query={}",
            urlencoding::encode(query)
        );
        Response::say(format!("Searching YouTube for {}...", query))
            .with_effect(SideEffect::OpenUrl(url))
    }

    async fn translate(&mut self, text: &str) -> Response {
        let Some((phrase, language)) = extract::split_translation(text) else {
            return Response::say(
                "Please specify text and target language (e.g., 'translate hello to Spanish').",
            );
        };

        let mut detail = None;
        if self.ai.is_online() {
            if let Some(translation) = self.ai.translate(phrase, language).await {
                return Response::say(
                    self.responses
                        .pick(ResponseSet::Translation, &[("text", translation.as_str())]),
                );
            }
            detail = Some("AI translation failed. Using basic fallback...");
        }

        let response = match phrasebook(phrase, language) {
            Some(translation) => Response::say(
                self.responses
                    .pick(ResponseSet::Translation, &[("text", translation)]),
            ),
            None => Response::say(format!(
                "I don't have a translation for '{}' to {} in my database.",
                phrase, language
            )),
        };
        match detail {
            Some(d) => response.with_detail(d),
            None => response,
        }
    }

    fn list_apps(&mut self) -> Response {
        let apps = self.launcher.apps();
        if apps.is_empty() {
            return Response::say("No applications are registered.");
        }
        Response::say(
            self.responses
                .pick(ResponseSet::AppList, &[("apps", apps.join(", ").as_str())]),
        )
        .with_detail(format!("Registered Applications:\n- {}", apps.join("\n- ")))
    }

    async fn weather(&self, location: &str) -> Response {
        let location = if location.is_empty() {
            self.default_location.as_str()
        } else {
            location
        };
        if location.is_empty() {
            return Response::say("Please specify a location, for example 'weather in London'.");
        }
        match self.lookup.weather(location).await {
            Ok(report) => Response::say(report.to_string()),
            Err(LookupError::NotConfigured(_)) => Response::say("Weather API key not configured"),
            Err(LookupError::NotFound(_)) => {
                Response::say(format!("Weather data not found for {}", location))
            }
            Err(e) => {
                warn!("⚠️ Weather lookup failed: {}", e);
                Response::say("Unable to retrieve weather data at this time")
            }
        }
    }

    fn launch(&mut self, app: &str) -> Response {
        if app.is_empty() {
            return Response::say("Which application should I open?");
        }
        match self.launcher.resolve(app) {
            Resolution::Resolved(command) => {
                let label = command.app.clone();
                let failure = self.responses.pick(ResponseSet::AppFail, &[("app", label.as_str())]);
                Response::say(self.responses.pick(ResponseSet::AppSuccess, &[("app", label.as_str())]))
                    .with_effect(SideEffect::LaunchApp { command, failure })
            }
            Resolution::Unsupported => {
                Response::say(format!("Application {} not in my protocol database", app))
            }
            Resolution::Unknown { suggestion } => {
                let mut text = format!("Application {} not in my protocol database", app);
                if let Some(s) = suggestion {
                    text.push_str(&format!(". Did you mean {}?", s));
                }
                Response::say(text)
            }
        }
    }

    fn status(&self, state: &SessionState) -> Response {
        let snap = self.monitor.snapshot();
        Response::say(format!(
            "AI: {} | Voice: {} | Theme: {} | CPU: {:.0}% | RAM: {:.0}%",
            if self.ai.is_online() { "Online" } else { "Offline" },
            state.voice_label(),
            state.theme.name(),
            snap.cpu_percent,
            snap.memory_percent
        ))
    }

    async fn diagnostics(&mut self, state: &SessionState) -> Response {
        let intro = self.responses.pick(ResponseSet::Diagnostics, &[]);
        let snap = self.monitor.snapshot();
        let online = monitor::probe_network(&self.diagnostics_probe).await;
        let active = |on: bool| if on { "Active" } else { "Inactive" };
        let data = self.memory.data();

        let report = [
            "=== SYSTEM HEALTH ===".to_string(),
            format!("CPU Usage: {:.1}%", snap.cpu_percent),
            format!("Memory Usage: {:.1}%", snap.memory_percent),
            String::new(),
            "=== NETWORK STATUS ===".to_string(),
            format!("Internet Connection: {}", active(online)),
            String::new(),
            "=== AI SYSTEMS ===".to_string(),
            format!(
                "{} Connection: {}",
                self.ai.provider().unwrap_or("AI"),
                active(self.ai.is_online())
            ),
            String::new(),
            "=== VOICE SYSTEMS ===".to_string(),
            format!("TTS Engine: {}", active(self.speech_output)),
            format!("Voice Recognition: {}", state.voice_label()),
            String::new(),
            "=== APPLICATION PROTOCOLS ===".to_string(),
            format!("Registered Apps: {}", self.launcher.apps().len()),
            String::new(),
            "=== MEMORY SYSTEMS ===".to_string(),
            format!("Personal Info Items: {}", data.personal_info.len()),
            format!("Custom Lists: {}", data.custom_lists.len()),
            format!("Custom Dictionaries: {}", data.custom_dicts.len()),
        ]
        .join("\n");

        let verdict = if report.contains("Inactive") {
            "Diagnostics complete. Minor anomalies detected."
        } else {
            "Diagnostics complete. All systems nominal."
        };
        Response::say(format!("{} {}", intro, verdict)).with_detail(report)
    }
}
