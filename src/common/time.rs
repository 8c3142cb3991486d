// Helpers de data/hora.
// Todo o sistema raciocina em "dias de calendário locais" (chaves YYYY-MM-DD
// no fuso do centro) enquanto os instantes persistidos são ISO-8601 em UTC.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::common::error::AppError;

// Offset fixo do centro (sem DST no Vietnã). Montado a partir de
// LOCAL_TZ_OFFSET_HOURS na carga da configuração.
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| FixedOffset::east_opt(7 * 3600).unwrap())
}

// Chave de dia (YYYY-MM-DD) do instante `now` no fuso local.
pub fn local_date_key(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).date_naive().format("%Y-%m-%d").to_string()
}

pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

pub fn parse_date_key(key: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("ngày không hợp lệ: {key}")))
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::BadRequest(format!("giờ không hợp lệ: {value}")))
}

// Combina uma chave de dia com um HH:mm local e devolve o instante UTC.
// É o equivalente de `new Date("{dateKey}T{hhmm}")` do front antigo.
pub fn local_datetime(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    date.and_time(time)
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.to_utc())
        // Offset fixo: todo horário local existe exatamente uma vez.
        .unwrap_or_else(|| DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc).to_utc())
}

// Todas as chaves de dia de um mês "YYYY-MM", em ordem.
pub fn month_date_keys(month: &str) -> Result<Vec<String>, AppError> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("tháng không hợp lệ: {month}")))?;

    let mut keys = Vec::with_capacity(31);
    let mut day = first;
    while day.month() == first.month() {
        keys.push(day.format("%Y-%m-%d").to_string());
        day += Duration::days(1);
    }
    Ok(keys)
}

// Índice de dia da semana no estilo JS: 0 = domingo ... 6 = sábado.
// O manifesto da agenda é indexado assim desde o sistema antigo.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_respects_local_offset() {
        let offset = offset_from_hours(7);
        // 23:30 UTC de 2026-03-01 já é 2026-03-02 em UTC+7.
        let now = "2026-03-01T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(local_date_key(now, offset), "2026-03-02");
    }

    #[test]
    fn local_datetime_round_trips_to_utc() {
        let offset = offset_from_hours(7);
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let time = parse_hhmm("07:30").unwrap();
        let instant = local_datetime(date, time, offset);
        assert_eq!(instant.to_rfc3339(), "2026-03-02T00:30:00+00:00");
    }

    #[test]
    fn month_keys_cover_whole_month() {
        let keys = month_date_keys("2026-02").unwrap();
        assert_eq!(keys.len(), 28);
        assert_eq!(keys.first().unwrap(), "2026-02-01");
        assert_eq!(keys.last().unwrap(), "2026-02-28");

        let keys = month_date_keys("2024-02").unwrap();
        assert_eq!(keys.len(), 29);
    }

    #[test]
    fn weekday_index_matches_js_convention() {
        // 2026-03-01 é um domingo.
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()), 0);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()), 1);
    }
}
