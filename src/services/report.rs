// src/services/report.rs
//
// O motor de conciliação: para cada dia, cruza as aulas registradas do
// professor (agenda) com as sessões de ponto reais e produz os "chips"
// rotulados que alimentam o quadro mensal e o fechamento de salário.
//
// Regras de pagamento (a agenda limita o pagamento, nunca o relógio):
//   - em dia: paga a duração da aula, chegada adiantada não vira hora extra;
//   - atraso: paga fim-da-aula − entrada-real, nunca negativo;
//   - esqueceu o check-out: passados 30min do fim da aula, paga a aula
//     inteira (benefício da dúvida);
//   - sessão fora da agenda: paga a duração real registrada.

use std::collections::HashSet;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

use crate::{
    common::{
        error::AppError,
        time::{local_datetime, month_date_keys, parse_date_key, parse_hhmm},
    },
    db::{AttendanceRepository, SalaryRepository, ScheduleRepository, UserRepository},
    models::{
        attendance::WorkSession,
        auth::User,
        dashboard::{ActivityEntry, DashboardStats},
        report::{Chip, ChipStyle, DayReport, MonthlyReport, RoleFilter, SalarySummary},
        schedule::{ScheduleDay, Section},
    },
};

// Janela de pareamento entre check-in e início de aula.
fn match_window() -> Duration {
    Duration::minutes(60)
}

// Tolerância depois do fim da aula antes de declarar "esqueceu o check-out".
fn checkout_grace() -> Duration {
    Duration::minutes(30)
}

// Remove os diacríticos vietnamitas para comparação de nomes em texto
// livre (o campo `gv` da agenda é digitado à mão).
pub fn strip_accents(input: &str) -> String {
    const GROUPS: &[(&str, char)] = &[
        ("àáạảãâầấậẩẫăằắặẳẵ", 'a'),
        ("èéẹẻẽêềếệểễ", 'e'),
        ("ìíịỉĩ", 'i'),
        ("òóọỏõôồốộổỗơờớợởỡ", 'o'),
        ("ùúụủũưừứựửữ", 'u'),
        ("ỳýỵỷỹ", 'y'),
        ("đ", 'd'),
        ("ÀÁẠẢÃÂẦẤẬẨẪĂẰẮẶẲẴ", 'A'),
        ("ÈÉẸẺẼÊỀẾỆỂỄ", 'E'),
        ("ÌÍỊỈĨ", 'I'),
        ("ÒÓỌỎÕÔỒỐỘỔỖƠỜỚỢỞỠ", 'O'),
        ("ÙÚỤỦŨƯỪỨỰỬỮ", 'U'),
        ("ỲÝỴỶỸ", 'Y'),
        ("Đ", 'D'),
    ];

    input
        .chars()
        .map(|c| {
            GROUPS
                .iter()
                .find(|(group, _)| group.contains(c))
                .map(|(_, plain)| *plain)
                .unwrap_or(c)
        })
        .collect()
}

fn fold(input: &str) -> String {
    strip_accents(input).to_lowercase()
}

// Arredonda segundos para minutos inteiros (meio minuto para cima).
fn round_minutes(span: Duration) -> i64 {
    (span.num_seconds() as f64 / 60.0).round() as i64
}

fn hhmm_local(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%H:%M").to_string()
}

// O professor está escalado nesta linha? Registro por id, ou — fallback
// legado — o nome/username aparece no campo de texto livre `gv`.
fn is_assigned(row_gv: &str, registered: bool, staff: &User) -> bool {
    if registered {
        return true;
    }
    if row_gv.is_empty() {
        return false;
    }
    let gv = fold(row_gv);
    let name = fold(&staff.name);
    let username = fold(&staff.username);
    (!name.is_empty() && gv.contains(&name)) || (!username.is_empty() && gv.contains(&username))
}

// Conciliação de um dia. Pura: `now` e o fuso entram como parâmetros.
pub fn calculate_daily_chips(
    schedule: &ScheduleDay,
    sessions: &[WorkSession],
    staff: &User,
    date: NaiveDate,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<Chip> {
    let mut chips = Vec::new();
    let mut used = HashSet::new();

    for section in Section::ALL {
        for row in schedule.rows(section) {
            let registered = row.registration_of(&staff.id).is_some();
            if !is_assigned(&row.gv, registered, staff) {
                continue;
            }

            // Linhas sem horário legível não geram chip.
            let (Ok(start_time), Ok(end_time)) = (parse_hhmm(&row.start), parse_hhmm(&row.end))
            else {
                continue;
            };
            let sched_start = local_datetime(date, start_time, offset);
            let sched_end = local_datetime(date, end_time, offset);
            let sched_duration = round_minutes(sched_end - sched_start);

            // Primeira sessão livre com entrada a menos de 60min do início
            // da aula; uma sessão consumida não pareia com outra linha.
            let matched = sessions.iter().find(|s| {
                if used.contains(&s.id) {
                    return false;
                }
                let Some(check_in) = s.clock_in() else { return false };
                (check_in - sched_start).abs() < match_window()
            });

            let mut label = format!("{}-{}", row.start, row.end);
            let mut tooltip = format!(
                "Lớp {}",
                if row.lop.is_empty() { "?" } else { row.lop.as_str() }
            );

            let Some(session) = matched else {
                if sched_start > now {
                    chips.push(Chip {
                        text: format!("{label} (Sắp tới)"),
                        style: ChipStyle::Blue,
                        paid_minutes: 0,
                        tooltip: "Chưa diễn ra".into(),
                        session_id: None,
                        session_data: None,
                        is_clickable: false,
                        is_teaching: false,
                    });
                } else {
                    chips.push(Chip {
                        text: format!("{label} (Vắng)"),
                        style: ChipStyle::Gray,
                        paid_minutes: 0,
                        tooltip: "Không có dữ liệu chấm công".into(),
                        session_id: None,
                        session_data: None,
                        is_clickable: false,
                        is_teaching: false,
                    });
                }
                continue;
            };

            used.insert(session.id.clone());
            let mut session_data = session.clone();
            let mut minutes: i64 = 0;
            let mut style = ChipStyle::Blue;
            let mut is_clickable = false;

            if session.check_out.is_some() {
                // Ponto completo: em dia ou atrasado.
                let actual_start = session.clock_in().unwrap_or(sched_start);

                if actual_start > sched_start {
                    let late_raw = (actual_start - sched_start).num_minutes();
                    minutes = round_minutes(sched_end - actual_start).max(0);
                    label.push_str(&format!(" (Trễ {late_raw}p)"));
                    style = ChipStyle::Orange;
                } else {
                    minutes = sched_duration;
                }

                match session_data.role.clone() {
                    Some(role_id) => {
                        style = ChipStyle::Green;
                        let role_name = session_data.role_name.clone().unwrap_or_default();
                        label.push_str(&format!(" ({role_name})"));
                        tooltip.push_str(&format!(" - Vai trò: {role_name}"));

                        // Conserto de dados antigos: sessão com papel mas sem
                        // snapshot do valor busca o valor atual do cadastro.
                        if session_data.role_rate.is_none() {
                            session_data.role_rate = staff.salary_config.rate_of(&role_id);
                        }
                    }
                    None => {
                        style = ChipStyle::Waiting;
                        label.push_str(" (Chọn Role?)");
                        tooltip.push_str(" - Bấm để chọn vai trò tính lương");
                    }
                }

                tooltip.push_str(" - Đã chấm công đầy đủ");
                is_clickable = true;
            } else if now > sched_end + checkout_grace() {
                minutes = sched_duration;
                style = ChipStyle::Orange;
                label.push_str(" (Quên ra)");
                tooltip.push_str(" - Quên Check-out (Tính đủ giờ)");
            } else {
                label.push_str(" (Đang dạy)");
                tooltip.push_str(" - Đang trong ca làm việc");
            }

            chips.push(Chip {
                text: label,
                style,
                paid_minutes: minutes.max(0),
                tooltip,
                session_id: Some(session_data.id.clone()),
                session_data: Some(session_data),
                is_clickable,
                is_teaching: true,
            });
        }
    }

    // Sessões que nenhuma aula consumiu: "ca ngoài lịch".
    for session in sessions {
        if used.contains(&session.id) {
            continue;
        }
        let Some(start) = session.clock_in() else { continue };
        let start_str = hhmm_local(start, offset);

        let mut tooltip = String::from("Chấm công không khớp lịch");
        let mut duration: i64 = 0;
        let label;
        let style;
        let mut is_clickable = false;

        if let Some(end) = session.check_out {
            let end_str = hhmm_local(end, offset);
            duration = round_minutes(end - start);

            match &session.role_name {
                Some(role_name) if session.role.is_some() => {
                    style = ChipStyle::Green;
                    label = format!("{start_str}-{end_str} ({role_name})");
                    tooltip.push_str(&format!(" - Vai trò: {role_name}"));
                }
                _ => {
                    style = ChipStyle::Waiting;
                    label = format!("{start_str}-{end_str} (Chọn Role?)");
                    tooltip.push_str(" - Bấm để chọn vai trò tính lương");
                }
            }

            tooltip.push_str(&format!(" - Làm việc {}h{}p", duration / 60, duration % 60));
            is_clickable = true;
        } else {
            style = ChipStyle::Blue;
            label = format!("{start_str}-??? (Đang dạy)");
        }

        chips.push(Chip {
            text: label,
            style,
            paid_minutes: duration.max(0),
            tooltip,
            session_id: Some(session.id.clone()),
            session_data: Some(session.clone()),
            is_clickable,
            is_teaching: false,
        });
    }

    chips
}

// O chip entra no filtro de categoria? A categoria é inferida por
// substring do nome do papel (convenção herdada do fechamento antigo).
fn filter_includes(chip: &Chip, filter: RoleFilter) -> bool {
    let Some(session) = &chip.session_data else { return false };
    let role_name = session.role_name.as_deref().unwrap_or("").to_lowercase();

    match filter {
        RoleFilter::All => true,
        RoleFilter::Teaching => {
            chip.is_teaching
                || role_name.contains("gv")
                || role_name.contains("giáo")
                || role_name.contains("trợ")
                || role_name.contains("ta")
        }
        RoleFilter::FrontDesk => {
            role_name.contains("tiếp")
                || role_name.contains("lễ")
                || role_name.contains("reception")
        }
    }
}

// Σ paid_minutes/60 × role_rate sobre os chips do filtro. Aritmética em
// f64, simplificação assumida do domínio.
pub fn gross_salary(chips: &[Chip], filter: RoleFilter) -> f64 {
    chips
        .iter()
        .filter(|c| filter_includes(c, filter))
        .map(|c| {
            let rate = c
                .session_data
                .as_ref()
                .and_then(|s| s.role_rate)
                .unwrap_or(0.0);
            (c.paid_minutes as f64 / 60.0) * rate
        })
        .sum()
}

#[derive(Clone)]
pub struct ReportService {
    attendance_repo: AttendanceRepository,
    schedule_repo: ScheduleRepository,
    user_repo: UserRepository,
    salary_repo: SalaryRepository,
    offset: FixedOffset,
}

impl ReportService {
    pub fn new(
        attendance_repo: AttendanceRepository,
        schedule_repo: ScheduleRepository,
        user_repo: UserRepository,
        salary_repo: SalaryRepository,
        offset: FixedOffset,
    ) -> Self {
        Self { attendance_repo, schedule_repo, user_repo, salary_repo, offset }
    }

    // Quadro do mês: um DayReport por dia de calendário, com os chips do
    // cruzamento agenda × ponto.
    pub async fn monthly_report(
        &self,
        staff_id: &str,
        month: &str,
        now: DateTime<Utc>,
    ) -> Result<MonthlyReport, AppError> {
        let (days, total_minutes) = self.build_month(staff_id, month, now).await?;
        Ok(MonthlyReport {
            month: month.to_string(),
            staff_id: staff_id.to_string(),
            days,
            total_minutes,
        })
    }

    // Fechamento: bruto pelos chips filtrados, líquido somando a folha de
    // avaliação e descontando o adiantamento.
    pub async fn salary_summary(
        &self,
        staff_id: &str,
        month: &str,
        filter: RoleFilter,
        now: DateTime<Utc>,
    ) -> Result<SalarySummary, AppError> {
        let (days, total_minutes) = self.build_month(staff_id, month, now).await?;
        let chips: Vec<Chip> = days.into_iter().flat_map(|d| d.chips).collect();

        let sheet = self
            .salary_repo
            .get(month, staff_id)
            .await?
            .unwrap_or_else(|| crate::models::salary::SalarySheet::empty(staff_id, month));

        let gross = gross_salary(&chips, filter);
        let bonus = sheet.bonus_total();

        Ok(SalarySummary {
            month: month.to_string(),
            staff_id: staff_id.to_string(),
            filter,
            total_minutes,
            gross_salary: gross,
            bonus_total: bonus,
            advance: sheet.advance,
            net_salary: gross + bonus - sheet.advance,
        })
    }

    async fn build_month(
        &self,
        staff_id: &str,
        month: &str,
        now: DateTime<Utc>,
    ) -> Result<(Vec<DayReport>, i64), AppError> {
        let staff = self
            .user_repo
            .find_by_id(staff_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let keys = month_date_keys(month)?;
        let first = keys.first().cloned().unwrap_or_default();
        let last = keys.last().cloned().unwrap_or_default();

        let attendance = self.attendance_repo.list_range(staff_id, &first, &last).await?;
        let schedules = self.schedule_repo.list_range(&first, &last).await?;

        let attendance_by_day: std::collections::HashMap<String, Vec<WorkSession>> =
            attendance.into_iter().map(|d| (d.date.clone(), d.sessions)).collect();
        let schedule_by_day: std::collections::HashMap<String, ScheduleDay> =
            schedules.into_iter().collect();

        let empty_schedule = ScheduleDay::default();
        let mut days = Vec::with_capacity(keys.len());
        let mut total_minutes = 0i64;

        for key in keys {
            let date = parse_date_key(&key)?;
            let schedule = schedule_by_day.get(&key).unwrap_or(&empty_schedule);
            let sessions = attendance_by_day.get(&key).map(Vec::as_slice).unwrap_or(&[]);

            let chips = calculate_daily_chips(schedule, sessions, &staff, date, now, self.offset);
            let paid: i64 = chips.iter().map(|c| c.paid_minutes).sum();
            total_minutes += paid;

            days.push(DayReport { date: key, chips, paid_minutes: paid });
        }

        Ok((days, total_minutes))
    }

    // Indicadores do painel do admin: contagem de cadastros, pontos do dia
    // e as cinco atividades mais recentes.
    pub async fn dashboard_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, AppError> {
        let total_users = self.user_repo.count().await?;

        let today_key = crate::common::time::local_date_key(now, self.offset);
        let logs = self.attendance_repo.list_by_date(&today_key).await?;
        let checked_in_count = logs.len() as i64;

        let mut recent: Vec<ActivityEntry> = logs
            .iter()
            .flat_map(|doc| {
                doc.sessions.iter().filter_map(move |s| {
                    let time = s.clock_in()?;
                    let status = if s.check_out.is_some() {
                        "Hoàn thành"
                    } else {
                        "Đang làm việc"
                    };
                    Some(ActivityEntry {
                        user: if doc.name.is_empty() { "N/A".into() } else { doc.name.clone() },
                        time,
                        status: status.into(),
                    })
                })
            })
            .collect();

        recent.sort_by(|a, b| b.time.cmp(&a.time));
        recent.truncate(5);

        Ok(DashboardStats { total_users, checked_in_count, recent_activity: recent })
    }
}
