// src/services/schedule.rs
//
// Agenda do dia + auto-registro de professores. Um dia sem agenda própria
// "herda" como modelo o dia mais próximo do mesmo dia da semana que tenha
// agenda explícita (registros zerados); o manifesto em settings indexa quem
// tem agenda explícita.

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::{PgConnection, PgPool};

use crate::{
    common::{
        error::AppError,
        time::{local_datetime, parse_date_key, parse_hhmm, weekday_index},
    },
    db::ScheduleRepository,
    models::{
        auth::User,
        schedule::{ScheduleDay, Section},
    },
};

#[derive(Clone)]
pub struct ScheduleService {
    repo: ScheduleRepository,
    pool: PgPool,
    offset: FixedOffset,
}

impl ScheduleService {
    pub fn new(repo: ScheduleRepository, pool: PgPool, offset: FixedOffset) -> Self {
        Self { repo, pool, offset }
    }

    // Documento explícito volta verbatim; senão, o modelo herdado (ou um
    // dia vazio quando não há vizinho).
    pub async fn get_schedule(&self, date_key: &str) -> Result<(ScheduleDay, bool), AppError> {
        parse_date_key(date_key)?;

        if let Some(day) = self.repo.get(&self.pool, date_key).await? {
            if day.has_any_section() {
                return Ok((day, false));
            }
        }

        let mut conn = self.pool.acquire().await?;
        match self.template_for(&mut conn, date_key).await? {
            Some(template) => Ok((template, true)),
            None => Ok((ScheduleDay::default(), false)),
        }
    }

    pub async fn save_schedule(&self, date_key: &str, doc: &ScheduleDay) -> Result<(), AppError> {
        parse_date_key(date_key)?;

        self.repo.put(&self.pool, date_key, doc).await?;

        // O manifesto é um documento separado: a atualização é best-effort.
        // Se falhar, só degrada a herança de modelo; a agenda em si já foi
        // gravada.
        if let Err(e) = self.index_in_manifest(date_key).await {
            tracing::warn!("Falha ao atualizar o manifesto de agendas para {date_key}: {e}");
        }

        Ok(())
    }

    // Toggle atômico de registro do professor numa linha. Se o dia ainda
    // não tem documento próprio, ele é materializado a partir do modelo
    // herdado DENTRO da mesma transação, e o resultado vira a agenda do dia.
    pub async fn register_class(
        &self,
        date_key: &str,
        section: Section,
        row_index: usize,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<ScheduleDay, AppError> {
        parse_date_key(date_key)?;

        let mut tx = self.pool.begin().await?;

        let existing = self.repo.get_for_update(&mut *tx, date_key).await?;
        let materialized = existing.is_none();
        let mut day = match existing {
            Some(day) => day,
            None => self
                .template_for(&mut tx, date_key)
                .await?
                .unwrap_or_default(),
        };

        let rows = day.rows_mut(section);
        let row = rows.get_mut(row_index).ok_or(AppError::ClassNotFound)?;

        // Registrado? O segundo clique desfaz.
        let name = if user.name.is_empty() { &user.username } else { &user.name };
        row.toggle_registration(&user.id, name, now);

        self.repo.put(&mut *tx, date_key, &day).await?;
        tx.commit().await?;

        if materialized {
            if let Err(e) = self.index_in_manifest(date_key).await {
                tracing::warn!("Falha ao indexar {date_key} no manifesto: {e}");
            }
        }

        Ok(day)
    }

    // Política de janela, aplicada pelo chamador do toggle: depois do fim
    // da aula não dá mais para registrar (nem cancelar o registro).
    pub fn ensure_not_ended(
        &self,
        date_key: &str,
        end_hhmm: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let date = parse_date_key(date_key)?;
        let end = parse_hhmm(end_hhmm)?;
        if now > local_datetime(date, end, self.offset) {
            return Err(AppError::ClassEnded);
        }
        Ok(())
    }

    // O modelo herdado: maior dia < date_key no mesmo dia da semana, com os
    // registros de professores zerados. Roda sobre a conexão do chamador
    // para valer dentro de transações.
    async fn template_for(
        &self,
        conn: &mut PgConnection,
        date_key: &str,
    ) -> Result<Option<ScheduleDay>, AppError> {
        let date = parse_date_key(date_key)?;
        let weekday = weekday_index(date);

        let manifest = self.repo.get_manifest(&mut *conn).await?;
        let Some(neighbor_key) = manifest.nearest_before(weekday, date_key) else {
            return Ok(None);
        };
        let neighbor_key = neighbor_key.to_string();

        let neighbor = self.repo.get(&mut *conn, &neighbor_key).await?;
        Ok(neighbor.map(ScheduleDay::sanitized))
    }

    async fn index_in_manifest(&self, date_key: &str) -> Result<(), AppError> {
        let date = parse_date_key(date_key)?;
        let weekday = weekday_index(date);

        // Read-modify-write do próprio manifesto, com a linha travada.
        let mut tx = self.pool.begin().await?;
        let mut manifest = self.repo.get_manifest_for_update(&mut *tx).await?;
        if manifest.insert(weekday, date_key) {
            self.repo.put_manifest(&mut *tx, &manifest).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
