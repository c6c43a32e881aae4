//! Chat-platform-agnostic command handling.
//!
//! A front end such as the CLI `chat` loop feeds each incoming message through
//! [`Dispatcher::handle`] and renders the returned replies. Errors never
//! escape: each one becomes a reply for that interaction.
//!
//! The dispatcher borrows a [`Store`], whose SQLite connection is not `Sync`,
//! across the submission `.await`, so `handle` returns a future that is not
//! `Send`. Drive it from a single thread, for example inside a tokio
//! `LocalSet`. It cannot be handed to `tokio::spawn`.

use chrono::{DateTime, Duration, FixedOffset};
use tracing::{info, warn};

use crate::adapter::Submit;
use crate::clock;
use crate::error::{ParkpassError, Result};
use crate::orders::DEFAULT_RECENT_LIMIT;
use crate::parser;
use crate::session::{PendingSelections, UserId};
use crate::store::Store;
use crate::types::{ParsedRequest, Vehicle, VehicleId, VehicleRef};

const RETRY_PROMPT: &str = "Не понял время. Примеры:\n  15:30\n  завтра 10:00\n  секвойя 18:45";
const HISTORY_SNIPPET_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Ask the user to pick one of `vehicles`, answered with `/pick <id>`.
    ChooseVehicle {
        prompt: String,
        vehicles: Vec<Vehicle>,
    },
}

impl Reply {
    fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cars,
    Add {
        name: String,
        plate: String,
        model: String,
    },
    Delete {
        name: String,
    },
    Pick {
        id: VehicleId,
    },
    Orders,
    History,
    /// A known command with missing or malformed arguments.
    Usage(&'static str),
    Unknown(String),
    /// Anything that is not a slash command: a pass request.
    Request(String),
}

impl Command {
    pub fn parse(text: &str) -> Command {
        let text = text.trim();
        if !text.starts_with('/') {
            return Command::Request(text.to_string());
        }

        let mut tokens = text.split_whitespace();
        let head = tokens.next().unwrap_or("/");
        let name = head[1..].split('@').next().unwrap_or("").to_lowercase();
        let args: Vec<&str> = tokens.collect();

        match name.as_str() {
            "start" | "help" => Command::Start,
            "cars" => Command::Cars,
            "add" => parse_add(&args),
            "del" | "delete" => match args.as_slice() {
                [] => Command::Usage("/del <имя>"),
                rest => Command::Delete {
                    name: rest.join(" "),
                },
            },
            "pick" => match args.as_slice() {
                [id] => id
                    .parse()
                    .map(|id| Command::Pick { id })
                    .unwrap_or(Command::Usage("/pick <id>")),
                _ => Command::Usage("/pick <id>"),
            },
            "orders" => Command::Orders,
            "history" => Command::History,
            _ => Command::Unknown(head.to_string()),
        }
    }
}

const ADD_USAGE: &str = "/add <имя> <номер> <модель>\nПример: /add секвойя А606ВО797 Тойота";

/// `/add <name> <plate> <model…>`. A purely numeric third token directly
/// after the plate is read as a separated region code (`А606ВО 797`).
fn parse_add(args: &[&str]) -> Command {
    if args.len() < 3 {
        return Command::Usage(ADD_USAGE);
    }
    let name = args[0].to_string();
    let (plate, model_start) = if args.len() >= 4 && args[2].chars().all(|c| c.is_ascii_digit()) {
        (format!("{} {}", args[1], args[2]), 3)
    } else {
        (args[1].to_string(), 2)
    };
    Command::Add {
        name,
        plate,
        model: args[model_start..].join(" "),
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher<'a, S> {
    store: &'a Store,
    submitter: S,
    default_vehicle: Option<String>,
    pending: PendingSelections,
}

fn format_time(ts: DateTime<FixedOffset>) -> String {
    ts.with_timezone(&clock::civil_offset())
        .format("%d.%m.%Y %H:%M")
        .to_string()
}

fn fleet_lines(vehicles: &[Vehicle]) -> String {
    vehicles
        .iter()
        .map(|v| format!("  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'a, S: Submit> Dispatcher<'a, S> {
    pub fn new(store: &'a Store, submitter: S) -> Self {
        Self {
            store,
            submitter,
            default_vehicle: None,
            pending: PendingSelections::default(),
        }
    }

    /// Vehicle used when a message names none. Without one the user is asked.
    pub fn with_default_vehicle(mut self, name: Option<String>) -> Self {
        self.default_vehicle = name.map(|n| n.trim().to_lowercase());
        self
    }

    pub fn with_pending_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.pending = PendingSelections::new(ttl);
        self
    }

    pub fn pending(&self) -> &PendingSelections {
        &self.pending
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// The returned future is `!Send`; see the module docs.
    pub async fn handle(&mut self, user: UserId, text: &str) -> Vec<Reply> {
        let command = Command::parse(text);
        match self.run(user, command).await {
            Ok(replies) => replies,
            Err(e) => {
                warn!(user, error = %e, "message handling failed");
                vec![Reply::text(format!("Ошибка: {e}"))]
            }
        }
    }

    async fn run(&mut self, user: UserId, command: Command) -> Result<Vec<Reply>> {
        match command {
            Command::Start => self.start(),
            Command::Cars => self.cars(),
            Command::Add { name, plate, model } => self.add(&name, &plate, &model),
            Command::Delete { name } => self.delete(&name),
            Command::Pick { id } => self.pick(user, id).await,
            Command::Orders => self.active_orders(),
            Command::History => self.history(),
            Command::Usage(usage) => Ok(vec![Reply::text(format!("Использование: {usage}"))]),
            Command::Unknown(cmd) => Ok(vec![Reply::text(format!(
                "Неизвестная команда {cmd}. Список команд: /start"
            ))]),
            Command::Request(text) => self.request(user, &text).await,
        }
    }

    fn start(&self) -> Result<Vec<Reply>> {
        let vehicles = self.store.vehicles().list_all()?;
        let default = self
            .default_vehicle
            .as_deref()
            .map(|d| format!("\n\nПо умолчанию: {d}"))
            .unwrap_or_default();
        Ok(vec![Reply::text(format!(
            "Привет! Я помогу заказать пропуск на парковку.\n\n\
             Просто напиши время въезда:\n  \
             15:30 - пропуск на сегодня 15:30\n  \
             завтра 10:00 - пропуск на завтра\n\n\
             Доступные машины:\n{}{default}\n\n\
             Пример: секвойя 15:30\n\n\
             Команды: /cars /add /del /orders /history",
            fleet_lines(&vehicles)
        ))])
    }

    fn cars(&self) -> Result<Vec<Reply>> {
        let vehicles = self.store.vehicles().list_all()?;
        if vehicles.is_empty() {
            return Ok(vec![Reply::text(format!("Машин в базе нет. Добавь: {ADD_USAGE}"))]);
        }
        Ok(vec![Reply::text(format!(
            "Машины в базе:\n{}",
            fleet_lines(&vehicles)
        ))])
    }

    fn add(&self, name: &str, plate: &str, model: &str) -> Result<Vec<Reply>> {
        match self.store.vehicles().add(name, plate, model) {
            Ok(v) => Ok(vec![Reply::text(format!("Машина добавлена: {v}"))]),
            Err(ParkpassError::DuplicateVehicle(name)) => Ok(vec![Reply::text(format!(
                "Машина '{name}' уже есть в базе"
            ))]),
            Err(ParkpassError::InvalidVehicle(reason)) => Ok(vec![Reply::text(format!(
                "Некорректные данные: {reason}\nИспользование: {ADD_USAGE}"
            ))]),
            Err(e) => Err(e),
        }
    }

    fn delete(&self, name: &str) -> Result<Vec<Reply>> {
        let reply = if self.store.vehicles().delete_by_name(name)? {
            format!("Машина '{}' удалена", name.trim().to_lowercase())
        } else {
            format!("Машина '{}' не найдена в базе", name.trim().to_lowercase())
        };
        Ok(vec![Reply::text(reply)])
    }

    fn active_orders(&self) -> Result<Vec<Reply>> {
        let orders = self.store.orders().list_active()?;
        if orders.is_empty() {
            return Ok(vec![Reply::text("Активных заказов нет")]);
        }
        let lines: Vec<String> = orders
            .iter()
            .map(|o| {
                format!(
                    "#{} {} ({}): {}",
                    o.id,
                    o.vehicle_name,
                    o.plate,
                    format_time(o.entry_time)
                )
            })
            .collect();
        Ok(vec![Reply::text(format!("Активные заказы:\n{}", lines.join("\n")))])
    }

    fn history(&self) -> Result<Vec<Reply>> {
        let orders = self.store.orders().list_recent(DEFAULT_RECENT_LIMIT)?;
        if orders.is_empty() {
            return Ok(vec![Reply::text("История пуста")]);
        }
        let lines: Vec<String> = orders
            .iter()
            .map(|o| {
                format!(
                    "#{} {} {} (создан {}): {}",
                    o.id,
                    o.vehicle_name,
                    format_time(o.entry_time),
                    format_time(o.created_at),
                    crate::html::truncate(&o.response_text, HISTORY_SNIPPET_CHARS)
                )
            })
            .collect();
        Ok(vec![Reply::text(format!("Последние заказы:\n{}", lines.join("\n")))])
    }

    async fn request(&mut self, user: UserId, text: &str) -> Result<Vec<Reply>> {
        let now = clock::now();
        let vehicles = self.store.vehicles().list_all()?;
        let parsed = parser::parse_message(text, &vehicles, now);

        let Some(entry_time) = parsed.entry_time else {
            return Ok(vec![Reply::text(RETRY_PROMPT)]);
        };

        let wanted = parsed.vehicle.or_else(|| self.default_vehicle.clone());
        let vehicle = match wanted {
            Some(name) => match vehicles.iter().find(|v| v.name == name) {
                Some(v) => VehicleRef::Resolved(v.clone()),
                None => {
                    return Ok(vec![Reply::text(format!(
                        "Машина '{name}' не найдена в базе"
                    ))])
                }
            },
            None => VehicleRef::Unresolved,
        };

        let request = ParsedRequest {
            vehicle,
            entry_time,
        };
        match request.vehicle {
            VehicleRef::Resolved(v) => Ok(self.submit(&v, request.entry_time).await),
            VehicleRef::Unresolved => {
                if vehicles.is_empty() {
                    return Ok(vec![Reply::text(format!(
                        "Машин в базе нет. Добавь: {ADD_USAGE}"
                    ))]);
                }
                self.pending.insert(user, request.entry_time, now);
                info!(user, entry_time = %request.entry_time, "waiting for vehicle selection");
                Ok(vec![Reply::ChooseVehicle {
                    prompt: format!(
                        "Время: {}\nВыбери машину: /pick <id>",
                        format_time(request.entry_time)
                    ),
                    vehicles,
                }])
            }
        }
    }

    /// Resolve a pending selection with the chosen vehicle and submit it.
    pub async fn pick(&mut self, user: UserId, id: VehicleId) -> Result<Vec<Reply>> {
        let now = clock::now();
        if self.pending.peek(user, now).is_none() {
            return Ok(vec![Reply::text(
                "Нет ожидающего заказа. Сначала напиши время въезда.",
            )]);
        }
        let Some(vehicle) = self.store.vehicles().find_by_id(id)? else {
            return Ok(vec![Reply::text(format!("Машина #{id} не найдена в базе"))]);
        };
        let Some(entry_time) = self.pending.take(user, now) else {
            return Ok(vec![Reply::text(
                "Нет ожидающего заказа. Сначала напиши время въезда.",
            )]);
        };
        Ok(self.submit(&vehicle, entry_time).await)
    }

    async fn submit(&self, vehicle: &Vehicle, entry_time: DateTime<FixedOffset>) -> Vec<Reply> {
        let mut replies = vec![Reply::text(format!(
            "Оформляю пропуск...\nМашина: {} ({}, {})\nВремя: {}",
            vehicle.name,
            vehicle.plate,
            vehicle.model,
            format_time(entry_time)
        ))];

        let result = self
            .submitter
            .submit(&vehicle.plate, &vehicle.model, entry_time)
            .await;

        if let Err(e) = self.store.orders().append(
            &vehicle.name,
            &vehicle.plate,
            &vehicle.model,
            entry_time,
            &result.message,
        ) {
            warn!(error = %e, "could not record order");
            replies.push(Reply::text(format!("Не удалось сохранить заказ: {e}")));
        }

        let message = if result.message.is_empty() {
            "Нет ответа"
        } else {
            result.message.as_str()
        };
        replies.push(Reply::text(if result.success {
            format!("Ответ сайта:\n\n{message}")
        } else {
            format!("Ошибка:\n\n{message}")
        }));
        replies
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
