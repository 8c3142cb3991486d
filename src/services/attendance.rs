// src/services/attendance.rs
//
// O gerente de ciclo de vida das sessões de ponto. Invariante central: no
// máximo UMA sessão aberta (check_out nulo) por (funcionário, dia), antes e
// depois de cada operação. Toda escrita é um read-modify-write atômico
// sobre o documento do dia, dentro de uma transação que trava a linha.

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        time::{local_date_key, local_datetime},
    },
    db::{AttendanceRepository, SettingsRepository, UserRepository},
    models::attendance::{AttendanceDoc, SessionId, SessionKind, WorkSession},
};

// Patch de edição: `check_out` usa Option duplo para distinguir "não
// enviado" de "limpar o valor" (reabrir a sessão).
#[derive(Debug, Default)]
pub struct SessionPatch {
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<Option<DateTime<Utc>>>,
}

#[derive(Clone)]
pub struct AttendanceService {
    repo: AttendanceRepository,
    user_repo: UserRepository,
    settings_repo: SettingsRepository,
    pool: PgPool,
    offset: FixedOffset,
}

impl AttendanceService {
    pub fn new(
        repo: AttendanceRepository,
        user_repo: UserRepository,
        settings_repo: SettingsRepository,
        pool: PgPool,
        offset: FixedOffset,
    ) -> Self {
        Self { repo, user_repo, settings_repo, pool, offset }
    }

    // Check-in do próprio funcionário, no dia local corrente.
    pub async fn check_in(
        &self,
        user_id: &str,
        full_name: &str,
        client_ip: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceDoc, AppError> {
        self.enforce_ip_allowlist(client_ip).await?;

        let date_key = local_date_key(now, self.offset);
        let doc_id = AttendanceDoc::doc_id(&date_key, user_id);

        let mut tx = self.pool.begin().await?;

        let mut doc = self
            .repo
            .get_for_update(&mut *tx, &doc_id)
            .await?
            .unwrap_or_else(|| AttendanceDoc::empty(user_id, full_name, &date_key));

        if let Some(open) = doc.open_session() {
            let started_at = open.clock_in().unwrap_or(now);
            return Err(AppError::already_open(started_at, self.offset));
        }

        doc.push_session(WorkSession::new(SessionId::from_instant(now), now, None));
        debug_assert!(doc.open_session_count() <= 1);

        self.repo.put(&mut *tx, &doc_id, &doc).await?;
        tx.commit().await?;

        Ok(doc)
    }

    pub async fn check_out(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceDoc, AppError> {
        let date_key = local_date_key(now, self.offset);
        let doc_id = AttendanceDoc::doc_id(&date_key, user_id);

        let mut tx = self.pool.begin().await?;

        let mut doc = self
            .repo
            .get_for_update(&mut *tx, &doc_id)
            .await?
            .ok_or(AppError::NoOpenSession)?;

        let open_index = doc
            .sessions
            .iter()
            .position(|s| s.is_open())
            .ok_or(AppError::NoOpenSession)?;

        doc.sessions[open_index].check_out = Some(now);
        doc.sync_mirror();

        self.repo.put(&mut *tx, &doc_id, &doc).await?;
        tx.commit().await?;

        Ok(doc)
    }

    // Chấm công bù: sessão retroativa lançada pelo admin. Propositalmente
    // SEM checagem de sessão aberta — o lançamento é histórico.
    pub async fn add_manual_session(
        &self,
        user_id: &str,
        date_key: &str,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceDoc, AppError> {
        let date = crate::common::time::parse_date_key(date_key)?;
        let start = local_datetime(date, check_in, self.offset);
        let end = check_out.map(|t| local_datetime(date, t, self.offset));

        // Nome para o documento novo, por consistência com o cadastro.
        let name = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .map(|u| if u.name.is_empty() { u.username } else { u.name })
            .unwrap_or_else(|| "N/A".to_string());

        let doc_id = AttendanceDoc::doc_id(date_key, user_id);

        let mut tx = self.pool.begin().await?;

        let mut doc = self
            .repo
            .get_for_update(&mut *tx, &doc_id)
            .await?
            .unwrap_or_else(|| AttendanceDoc::empty(user_id, &name, date_key));

        let mut session = WorkSession::new(SessionId::from_instant(now), start, end);
        session.kind = Some(SessionKind::Manual);
        doc.push_session(session);

        self.repo.put(&mut *tx, &doc_id, &doc).await?;
        tx.commit().await?;

        Ok(doc)
    }

    pub async fn edit_session(
        &self,
        user_id: &str,
        date_key: &str,
        session_id: &SessionId,
        patch: SessionPatch,
    ) -> Result<AttendanceDoc, AppError> {
        let doc_id = AttendanceDoc::doc_id(date_key, user_id);

        let mut tx = self.pool.begin().await?;

        let mut doc = self
            .repo
            .get_for_update(&mut *tx, &doc_id)
            .await?
            .ok_or(AppError::RecordNotFound)?;

        let index = doc.position_of(session_id).ok_or(AppError::SessionNotFound)?;
        let session = &mut doc.sessions[index];

        if let Some(check_in) = patch.check_in {
            session.check_in = Some(check_in);
            // O campo duplicado anda junto.
            session.start = Some(check_in);
        }
        if let Some(check_out) = patch.check_out {
            session.check_out = check_out;
        }

        doc.sync_mirror();

        self.repo.put(&mut *tx, &doc_id, &doc).await?;
        tx.commit().await?;

        Ok(doc)
    }

    pub async fn delete_session(
        &self,
        user_id: &str,
        date_key: &str,
        session_id: &SessionId,
    ) -> Result<AttendanceDoc, AppError> {
        let doc_id = AttendanceDoc::doc_id(date_key, user_id);

        let mut tx = self.pool.begin().await?;

        let mut doc = self
            .repo
            .get_for_update(&mut *tx, &doc_id)
            .await?
            .ok_or(AppError::RecordNotFound)?;

        let index = doc.position_of(session_id).ok_or(AppError::SessionNotFound)?;
        doc.sessions.remove(index);
        doc.sync_mirror();

        self.repo.put(&mut *tx, &doc_id, &doc).await?;
        tx.commit().await?;

        Ok(doc)
    }

    // Carimba papel/nome/valor na sessão. O valor é snapshot: reajustes
    // futuros do papel não mexem no histórico já atribuído.
    pub async fn assign_role(
        &self,
        user_id: &str,
        date_key: &str,
        session_id: &SessionId,
        role_id: &str,
    ) -> Result<AttendanceDoc, AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let role = user
            .salary_config
            .effective_roles()
            .into_iter()
            .find(|r| r.id == role_id)
            .ok_or(AppError::RoleNotConfigured)?;

        let doc_id = AttendanceDoc::doc_id(date_key, user_id);

        let mut tx = self.pool.begin().await?;

        let mut doc = self
            .repo
            .get_for_update(&mut *tx, &doc_id)
            .await?
            .ok_or(AppError::RecordNotFound)?;

        let index = doc.position_of(session_id).ok_or(AppError::SessionNotFound)?;
        let session = &mut doc.sessions[index];
        session.role = Some(role.id.clone());
        session.role_name = Some(role.name.clone());
        session.role_rate = Some(role.rate);

        self.repo.put(&mut *tx, &doc_id, &doc).await?;
        tx.commit().await?;

        Ok(doc)
    }

    pub async fn get_day(
        &self,
        user_id: &str,
        date_key: &str,
    ) -> Result<Option<AttendanceDoc>, AppError> {
        self.repo.get(&AttendanceDoc::doc_id(date_key, user_id)).await
    }

    pub async fn today(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AttendanceDoc>, AppError> {
        self.get_day(user_id, &local_date_key(now, self.offset)).await
    }

    // Política da lista de IPs: fecha na divergência explícita, abre quando
    // não dá para saber o IP (rede instável não pode impedir o ponto).
    async fn enforce_ip_allowlist(&self, client_ip: Option<&str>) -> Result<(), AppError> {
        let settings = match self.settings_repo.get_system().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Checagem de IP pulada: falha ao ler configurações: {e}");
                return Ok(());
            }
        };

        let allowed = settings.allowed_ips();
        if allowed.is_empty() {
            return Ok(());
        }

        match client_ip {
            None => {
                tracing::warn!("Checagem de IP pulada: endereço do cliente desconhecido.");
                Ok(())
            }
            Some(ip) if allowed.iter().any(|a| a == ip) => Ok(()),
            Some(ip) => Err(AppError::ForbiddenNetwork { ip: ip.to_string() }),
        }
    }
}
