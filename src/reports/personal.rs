// src/reports/personal.rs
//! Per-user reports, always scoped to the signed-in user

use serde::Serialize;

use super::aggregation::{group_by_field, GroupedCounts};
use super::chart::{loan_activity_series, BarSeries};
use super::document::{format_date, render_tabular_document, Section, TabularDocument};
use crate::api::LabApi;
use crate::error::ClientResult;
use crate::models::{LabReservation, LoanActivityReport, ReservationStatus, UserLabReport};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalLabReport {
    pub user_id: i64,
    pub report: UserLabReport,
    pub reservations_by_status: GroupedCounts,
}

impl PersonalLabReport {
    /// Fails without a request when no user id is available.
    pub async fn load<A>(session: &Session, api: &A) -> ClientResult<Self>
    where
        A: LabApi + ?Sized,
    {
        let user_id = session.current_user_id()?;
        Self::fetch(api, user_id).await
    }

    /// Loads the report of `user_id`; callers resolve the id from the session.
    pub async fn fetch<A>(api: &A, user_id: i64) -> ClientResult<Self>
    where
        A: LabApi + ?Sized,
    {
        let report = api.user_lab_report(user_id).await?;
        Ok(Self::from_report(user_id, report))
    }

    pub fn from_report(user_id: i64, report: UserLabReport) -> Self {
        let reservations_by_status =
            group_by_field(&report.all_reservations, "estado", ReservationStatus::all_values());
        Self {
            user_id,
            report,
            reservations_by_status,
        }
    }

    /// Total as reported by the backend, else the length of the reservation list.
    pub fn total_reservations(&self) -> usize {
        usize::try_from(self.report.total_reservations)
            .ok()
            .filter(|total| *total > 0)
            .unwrap_or(self.report.all_reservations.len())
    }

    pub fn document(&self) -> TabularDocument {
        render_tabular_document(
            &format!("Reporte de laboratorios (usuario {})", self.user_id),
            vec![
                reservation_section("Todas las reservas", &self.report.all_reservations),
                reservation_section("Laboratorios prestados", &self.report.lent_labs),
                reservation_section("Laboratorios no entregados", &self.report.unreturned_labs),
            ],
        )
    }
}

fn reservation_section(title: &str, reservations: &[LabReservation]) -> Section {
    let mut section = Section::new(title, &["ID", "Laboratorio", "Fecha Inicio", "Fecha Fin", "Estado"]);
    for r in reservations {
        section.push_row(vec![
            Some(r.id.to_string()),
            r.laboratory_name
                .clone()
                .or_else(|| r.laboratory_id.map(|id| format!("#{}", id))),
            r.starts_on.as_deref().map(format_date),
            r.ends_on.as_deref().map(format_date),
            Some(r.status.clone()),
        ]);
    }
    section
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalLoanReport {
    pub user_id: i64,
    pub activity: LoanActivityReport,
}

impl PersonalLoanReport {
    pub async fn load<A>(session: &Session, api: &A) -> ClientResult<Self>
    where
        A: LabApi + ?Sized,
    {
        let user_id = session.current_user_id()?;
        let activity = api.user_loan_report(user_id).await?;
        if activity.is_ragged() {
            tracing::warn!(user_id, dates = activity.dates.len(), "loan report series have different lengths");
        }
        Ok(Self { user_id, activity })
    }

    pub fn chart(&self) -> BarSeries {
        loan_activity_series(&self.activity)
    }

    pub fn document(&self) -> TabularDocument {
        let series = self.chart();
        let mut section = Section::new("Préstamos por día", &["Fecha", "Préstamos", "Devoluciones"]);
        for (index, date) in series.labels.iter().enumerate() {
            section.push_row(vec![
                Some(format_date(date)),
                series.datasets.first().map(|d| d.values[index].to_string()),
                series.datasets.get(1).map(|d| d.values[index].to_string()),
            ]);
        }
        render_tabular_document(&format!("Reporte de préstamos (usuario {})", self.user_id), vec![section])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::models::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub(crate) struct FakeReportApi {
        pub requested_for: AtomicUsize,
        pub lab_report_calls: AtomicUsize,
    }

    #[async_trait]
    impl LabApi for FakeReportApi {
        async fn login(&self, _c: &Credentials) -> ClientResult<User> {
            Err(ClientError::Backend { status: 501, message: "not used".to_string() })
        }
        async fn register(&self, _f: &RegistrationForm) -> ClientResult<User> {
            Err(ClientError::Backend { status: 501, message: "not used".to_string() })
        }
        async fn users(&self) -> ClientResult<Vec<User>> { Ok(Vec::new()) }
        async fn laboratories(&self) -> ClientResult<Vec<Laboratory>> { Ok(Vec::new()) }
        async fn equipment(&self) -> ClientResult<Vec<Equipment>> { Ok(Vec::new()) }
        async fn categories(&self) -> ClientResult<Vec<EquipmentCategory>> { Ok(Vec::new()) }
        async fn loans(&self) -> ClientResult<Vec<Loan>> { Ok(Vec::new()) }
        async fn reservations(&self) -> ClientResult<Vec<LabReservation>> { Ok(Vec::new()) }
        async fn maintenance(&self) -> ClientResult<Vec<MaintenanceRecord>> { Ok(Vec::new()) }

        async fn user_loan_report(&self, user_id: i64) -> ClientResult<LoanActivityReport> {
            self.requested_for.store(user_id as usize, Ordering::SeqCst);
            Ok(serde_json::from_str(
                r#"{"dates": ["2024-05-01", "2024-05-02"], "prestamos": [2, 1], "devoluciones": [0]}"#,
            )?)
        }

        async fn user_lab_report(&self, user_id: i64) -> ClientResult<UserLabReport> {
            self.requested_for.store(user_id as usize, Ordering::SeqCst);
            self.lab_report_calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_str(
                r#"{"todas_reservas": [
                        {"reserva_id": 1, "laboratorio_id": 4, "laboratorio_nombre": "Electrónica II",
                         "fecha_inicio": "2024-05-01", "estado": "aprobada"},
                        {"reserva_id": 2, "laboratorio_id": 5, "estado": "pendiente"}],
                    "laboratorios_no_entregados": []}"#,
            )?)
        }
    }

    pub(crate) fn signed_in(id: Option<i64>) -> Session {
        let mut session = Session::new();
        session.complete_login(User {
            id,
            first_name: "Eva".to_string(),
            last_name: "Paz".to_string(),
            email: "eva@usb.edu".to_string(),
            national_id: None,
            role: "estudiante".to_string(),
            registered_at: None,
        });
        session
    }

    #[tokio::test]
    async fn test_lab_report_for_current_user() {
        let api = FakeReportApi::default();
        let report = PersonalLabReport::load(&signed_in(Some(7)), &api).await.unwrap();

        assert_eq!(api.requested_for.load(Ordering::SeqCst), 7);
        assert_eq!(report.total_reservations(), 2);
        assert_eq!(report.reservations_by_status.get("aprobada"), Some(1));
        assert!(report.report.lent_labs.is_empty());

        let doc = report.document();
        assert_eq!(doc.sections.len(), 1);
        let all = doc.section("Todas las reservas").unwrap();
        assert_eq!(all.rows[0], vec!["1", "Electrónica II", "01/05/2024", "N/A", "aprobada"]);
        assert_eq!(all.rows[1][1], "#5");
    }

    #[tokio::test]
    async fn test_missing_user_id_skips_the_request() {
        let api = FakeReportApi::default();

        let err = PersonalLabReport::load(&signed_in(None), &api).await.unwrap_err();
        assert!(matches!(err, ClientError::Precondition(_)));
        let err = PersonalLoanReport::load(&Session::new(), &api).await.unwrap_err();
        assert!(matches!(err, ClientError::Precondition(_)));

        assert_eq!(api.requested_for.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loan_report_document() {
        let api = FakeReportApi::default();
        let report = PersonalLoanReport::load(&signed_in(Some(3)), &api).await.unwrap();

        assert_eq!(report.activity.total_loans(), 3);
        let doc = report.document();
        let rows = &doc.sections[0].rows;
        assert_eq!(rows[0], vec!["01/05/2024", "2", "0"]);
        assert_eq!(rows[1], vec!["02/05/2024", "1", "0"]);
    }
}
