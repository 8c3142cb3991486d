// src/services/report_tests.rs

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Utc};

    use crate::common::time::{local_datetime, offset_from_hours, parse_hhmm};
    use crate::models::attendance::{SessionId, WorkSession};
    use crate::models::auth::{User, UserRole};
    use crate::models::report::{Chip, ChipStyle, RoleFilter};
    use crate::models::salary::{SalaryConfig, SalaryRole};
    use crate::models::schedule::{ClassRow, ScheduleDay, Section, TeacherRegistration};
    use crate::services::report::{calculate_daily_chips, gross_salary, strip_accents};

    const STAFF_ID: &str = "nv_lan";

    fn offset() -> chrono::FixedOffset {
        offset_from_hours(7)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    // Instante UTC correspondente a um HH:mm local do dia de teste.
    fn at(hhmm: &str) -> DateTime<Utc> {
        local_datetime(date(), parse_hhmm(hhmm).unwrap(), offset())
    }

    fn staff() -> User {
        User {
            id: STAFF_ID.into(),
            username: "lan".into(),
            password: String::new(),
            name: "Nguyễn Thị Lan".into(),
            role: UserRole::Staff,
            salary_config: SalaryConfig {
                roles: vec![
                    SalaryRole {
                        id: "role_gv".into(),
                        name: "GV Tiếng Anh".into(),
                        rate: 120_000.0,
                        is_default: true,
                    },
                    SalaryRole {
                        id: "role_tt".into(),
                        name: "Tiếp tân".into(),
                        rate: 30_000.0,
                        is_default: false,
                    },
                ],
                rate: None,
                attendance: None,
            },
            created_at: at("00:00"),
        }
    }

    fn registered_row(start: &str, end: &str) -> ClassRow {
        ClassRow {
            start: start.into(),
            end: end.into(),
            lop: "KID-1".into(),
            registered_teachers: vec![TeacherRegistration {
                id: STAFF_ID.into(),
                name: "Lan".into(),
                timestamp: at("06:00"),
            }],
            ..Default::default()
        }
    }

    fn schedule_with(section: Section, rows: Vec<ClassRow>) -> ScheduleDay {
        let mut day = ScheduleDay::default();
        *day.rows_mut(section) = rows;
        day
    }

    fn session(id: i64, check_in: &str, check_out: Option<&str>) -> WorkSession {
        WorkSession::new(SessionId::Timestamp(id), at(check_in), check_out.map(at))
    }

    fn chips_for(day: &ScheduleDay, sessions: &[WorkSession], now: &str) -> Vec<Chip> {
        calculate_daily_chips(day, sessions, &staff(), date(), at(now), offset())
    }

    // ---- Estados sem pareamento ----

    #[test]
    fn class_in_past_without_sessions_is_absent() {
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let chips = chips_for(&day, &[], "10:00");

        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].style, ChipStyle::Gray);
        assert_eq!(chips[0].paid_minutes, 0);
        assert!(chips[0].text.contains("Vắng"));
    }

    #[test]
    fn class_in_future_is_upcoming() {
        let day = schedule_with(Section::Evening1, vec![registered_row("18:00", "19:30")]);
        let chips = chips_for(&day, &[], "10:00");

        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].style, ChipStyle::Blue);
        assert_eq!(chips[0].paid_minutes, 0);
        assert!(chips[0].text.contains("Sắp tới"));
    }

    #[test]
    fn unassigned_rows_produce_no_chip() {
        let mut row = registered_row("07:30", "09:00");
        row.registered_teachers.clear();
        let day = schedule_with(Section::Morning1, vec![row]);

        assert!(chips_for(&day, &[], "10:00").is_empty());
    }

    // ---- Pareamento e status ----

    #[test]
    fn late_checkin_deducts_late_minutes() {
        // Aula 07:30–09:00, entrada 07:35, saída 09:00 → 85 minutos pagos.
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let sessions = [session(1, "07:35", Some("09:00"))];
        let chips = chips_for(&day, &sessions, "10:00");

        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].paid_minutes, 85);
        assert!(chips[0].text.contains("Trễ 5p"));
        // Sem papel atribuído: aguardando escolha, clicável.
        assert_eq!(chips[0].style, ChipStyle::Waiting);
        assert!(chips[0].is_clickable);
        assert!(chips[0].is_teaching);
    }

    #[test]
    fn early_checkin_pays_scheduled_duration_only() {
        // Entrada 07:20 numa aula 07:30–09:00: paga 90, não 100.
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let sessions = [session(1, "07:20", Some("09:00"))];
        let chips = chips_for(&day, &sessions, "10:00");

        assert_eq!(chips[0].paid_minutes, 90);
        assert!(!chips[0].text.contains("Trễ"));
    }

    #[test]
    fn forgot_checkout_pays_full_duration_after_grace() {
        // Sem check-out e 40min depois do fim: paga a aula inteira.
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let sessions = [session(1, "07:28", None)];
        let chips = chips_for(&day, &sessions, "09:40");

        assert_eq!(chips[0].paid_minutes, 90);
        assert_eq!(chips[0].style, ChipStyle::Orange);
        assert!(chips[0].text.contains("Quên ra"));
    }

    #[test]
    fn open_session_within_grace_is_in_progress_unpaid() {
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let sessions = [session(1, "07:28", None)];
        let chips = chips_for(&day, &sessions, "09:10");

        assert_eq!(chips[0].paid_minutes, 0);
        assert_eq!(chips[0].style, ChipStyle::Blue);
        assert!(chips[0].text.contains("Đang dạy"));
    }

    #[test]
    fn checkin_outside_window_does_not_match() {
        // Entrada 10:00 numa aula 07:30: fora da janela de 60min → ausência
        // + chip de ca fora da agenda.
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let sessions = [session(1, "10:00", Some("11:00"))];
        let chips = chips_for(&day, &sessions, "12:00");

        assert_eq!(chips.len(), 2);
        assert!(chips[0].text.contains("Vắng"));
        assert!(chips[1].text.contains("10:00-11:00"));
        assert_eq!(chips[1].paid_minutes, 60);
    }

    // ---- Desempate e consumo ----

    #[test]
    fn first_session_in_list_wins_and_is_consumed_once() {
        // Duas sessões na janela da mesma aula: a primeira da lista pareia;
        // a segunda vira ca fora da agenda.
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let sessions = [
            session(1, "07:32", Some("09:00")),
            session(2, "07:40", Some("09:05")),
        ];
        let chips = chips_for(&day, &sessions, "10:00");

        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].session_id, Some(SessionId::Timestamp(1)));
        assert_eq!(chips[1].session_id, Some(SessionId::Timestamp(2)));
        assert!(chips[1].tooltip.contains("không khớp lịch"));
    }

    #[test]
    fn consumed_session_cannot_match_a_second_row() {
        // Duas aulas coladas e uma única sessão: ela pareia com a primeira
        // linha e a segunda fica ausente.
        let day = schedule_with(
            Section::Morning1,
            vec![registered_row("07:30", "08:15"), registered_row("08:15", "09:00")],
        );
        let sessions = [session(1, "07:30", Some("09:00"))];
        let chips = chips_for(&day, &sessions, "10:00");

        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].paid_minutes, 45);
        assert!(chips[1].text.contains("Vắng"));
    }

    // ---- Fallback por nome no campo livre ----

    #[test]
    fn gv_free_text_matches_accent_stripped_name() {
        let mut row = registered_row("07:30", "09:00");
        row.registered_teachers.clear();
        // A recepção digitou o nome com acento diferente do cadastro.
        row.gv = "Cô NGUYEN THI LAN (chính)".into();
        let day = schedule_with(Section::Morning1, vec![row]);

        let chips = chips_for(&day, &[], "10:00");
        assert_eq!(chips.len(), 1);
    }

    #[test]
    fn strip_accents_covers_vietnamese_letters() {
        assert_eq!(strip_accents("Nguyễn Thị Hằng"), "Nguyen Thi Hang");
        assert_eq!(strip_accents("ĐẶNG VĂN ĐỨC"), "DANG VAN DUC");
    }

    // ---- Papel de pagamento ----

    #[test]
    fn role_assigned_chip_is_green_and_carries_snapshot() {
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let mut s = session(1, "07:30", Some("09:00"));
        s.role = Some("role_gv".into());
        s.role_name = Some("GV Tiếng Anh".into());
        s.role_rate = Some(100_000.0);

        let chips = chips_for(&day, &[s], "10:00");
        assert_eq!(chips[0].style, ChipStyle::Green);
        // O snapshot antigo vale mais que o cadastro atual (120k).
        assert_eq!(chips[0].session_data.as_ref().unwrap().role_rate, Some(100_000.0));
    }

    #[test]
    fn missing_rate_snapshot_is_repaired_from_config() {
        let day = schedule_with(Section::Morning1, vec![registered_row("07:30", "09:00")]);
        let mut s = session(1, "07:30", Some("09:00"));
        s.role = Some("role_gv".into());
        s.role_name = Some("GV Tiếng Anh".into());

        let chips = chips_for(&day, &[s], "10:00");
        assert_eq!(chips[0].session_data.as_ref().unwrap().role_rate, Some(120_000.0));
    }

    // ---- Agregação de salário ----

    fn paid_chip(minutes: i64, role_name: &str, rate: f64, teaching: bool) -> Chip {
        let mut s = session(9, "07:30", Some("09:00"));
        s.role = Some("r".into());
        s.role_name = Some(role_name.into());
        s.role_rate = Some(rate);
        Chip {
            text: String::new(),
            style: ChipStyle::Green,
            paid_minutes: minutes,
            tooltip: String::new(),
            session_id: Some(s.id.clone()),
            session_data: Some(s),
            is_clickable: false,
            is_teaching: teaching,
        }
    }

    #[test]
    fn gross_salary_multiplies_hours_by_rate() {
        let chips = [paid_chip(90, "GV Tiếng Anh", 120_000.0, true)];
        assert_eq!(gross_salary(&chips, RoleFilter::All), 180_000.0);
    }

    #[test]
    fn role_filter_selects_by_name_category() {
        let chips = [
            paid_chip(60, "GV Tiếng Anh", 120_000.0, true),
            paid_chip(120, "Tiếp tân ca sáng", 30_000.0, false),
        ];

        assert_eq!(gross_salary(&chips, RoleFilter::All), 180_000.0);
        assert_eq!(gross_salary(&chips, RoleFilter::Teaching), 120_000.0);
        assert_eq!(gross_salary(&chips, RoleFilter::FrontDesk), 60_000.0);
    }

    #[test]
    fn chips_without_rate_contribute_zero() {
        let mut chip = paid_chip(60, "GV", 0.0, true);
        chip.session_data.as_mut().unwrap().role_rate = None;
        assert_eq!(gross_salary(&[chip], RoleFilter::All), 0.0);
    }
}
