// src/reports/dashboard.rs
//! Admin dashboard: concurrent fetch, aggregation and the exportable panel

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::aggregation::{equipment_by_category, group_by_field, top_n, GroupedCounts, RankedEquipment};
use super::chart::{
    build_chart_series, ChartSeries, EQUIPMENT_PALETTE, LAB_PALETTE, LOAN_PALETTE, RESERVATION_PALETTE, USER_PALETTE,
};
use super::document::{format_date, render_tabular_document, Column, Section, TabularDocument};
use crate::api::LabApi;
use crate::error::ClientResult;
use crate::models::*;
use crate::navigation::{Platform, Screen};
use crate::session::Session;

pub const MOST_REQUESTED_LIMIT: usize = 5;
pub const DASHBOARD_TITLE: &str = "Panel de Administración";

// ==================== SNAPSHOT ====================

/// Every collection the dashboard reads, fetched in one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSnapshot {
    pub users: Vec<User>,
    pub laboratories: Vec<Laboratory>,
    pub equipment: Vec<Equipment>,
    pub categories: Vec<EquipmentCategory>,
    pub loans: Vec<Loan>,
    pub reservations: Vec<LabReservation>,
    pub maintenance: Vec<MaintenanceRecord>,
}

impl DashboardSnapshot {
    /// Issues the seven list requests concurrently. The first failure wins.
    pub async fn fetch<A>(api: &A) -> ClientResult<Self>
    where
        A: LabApi + ?Sized,
    {
        let (users, laboratories, equipment, categories, loans, reservations, maintenance) = tokio::try_join!(
            api.users(),
            api.laboratories(),
            api.equipment(),
            api.categories(),
            api.loans(),
            api.reservations(),
            api.maintenance(),
        )?;

        tracing::debug!(
            users = users.len(),
            laboratories = laboratories.len(),
            equipment = equipment.len(),
            loans = loans.len(),
            reservations = reservations.len(),
            "dashboard snapshot fetched"
        );

        Ok(Self {
            users,
            laboratories,
            equipment,
            categories,
            loans,
            reservations,
            maintenance,
        })
    }
}

// ==================== AGGREGATES ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    pub total_users: usize,
    pub total_laboratories: usize,
    pub total_equipment: usize,
    pub total_categories: usize,
    pub total_loans: usize,
    pub total_reservations: usize,
    pub total_maintenance: usize,
    pub users_by_role: GroupedCounts,
    pub labs_by_type: GroupedCounts,
    pub equipment_by_category: GroupedCounts,
    pub equipment_by_status: GroupedCounts,
    pub loans_by_status: GroupedCounts,
    pub reservations_by_status: GroupedCounts,
    pub most_requested: Vec<RankedEquipment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCharts {
    pub users: ChartSeries,
    pub laboratories: ChartSeries,
    pub equipment: ChartSeries,
    pub loans: ChartSeries,
    pub reservations: ChartSeries,
}

impl DashboardReport {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        Self {
            total_users: snapshot.users.len(),
            total_laboratories: snapshot.laboratories.len(),
            total_equipment: snapshot.equipment.len(),
            total_categories: snapshot.categories.len(),
            total_loans: snapshot.loans.len(),
            total_reservations: snapshot.reservations.len(),
            total_maintenance: snapshot.maintenance.len(),
            users_by_role: group_by_field(&snapshot.users, "tipo_usuario", UserRole::all_values()),
            labs_by_type: group_by_field(&snapshot.laboratories, "tipo_laboratorio", LabType::all_values()),
            equipment_by_category: equipment_by_category(&snapshot.equipment, &snapshot.categories),
            equipment_by_status: group_by_field(&snapshot.equipment, "estado", EquipmentStatus::all_values()),
            loans_by_status: group_by_field(&snapshot.loans, "estado", LoanStatus::all_values()),
            reservations_by_status: group_by_field(
                &snapshot.reservations,
                "estado",
                ReservationStatus::all_values(),
            ),
            most_requested: top_n(&snapshot.loans, &snapshot.equipment, MOST_REQUESTED_LIMIT),
        }
    }

    pub fn charts(&self) -> DashboardCharts {
        DashboardCharts {
            users: build_chart_series(&self.users_by_role, USER_PALETTE),
            laboratories: build_chart_series(&self.labs_by_type, LAB_PALETTE),
            equipment: build_chart_series(&self.equipment_by_category, EQUIPMENT_PALETTE),
            loans: build_chart_series(&self.loans_by_status, LOAN_PALETTE),
            reservations: build_chart_series(&self.reservations_by_status, RESERVATION_PALETTE),
        }
    }
}

/// The polled value: raw collections plus what was derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub snapshot: DashboardSnapshot,
    pub report: DashboardReport,
}

impl Dashboard {
    pub fn from_snapshot(snapshot: DashboardSnapshot) -> Self {
        let report = DashboardReport::from_snapshot(&snapshot);
        Self { snapshot, report }
    }

    pub async fn load<A>(api: &A) -> ClientResult<Self>
    where
        A: LabApi + ?Sized,
    {
        Ok(Self::from_snapshot(DashboardSnapshot::fetch(api).await?))
    }

    /// Loads the dashboard after checking the session may open it.
    pub async fn load_for_session<A>(session: &Session, api: &A, platform: Platform) -> ClientResult<Self>
    where
        A: LabApi + ?Sized,
    {
        session.authorize(Screen::AdminDashboard, platform)?;
        Self::load(api).await
    }

    pub fn document(&self) -> TabularDocument {
        render_tabular_document(DASHBOARD_TITLE, self.sections())
    }

    /// Collection tables with foreign keys resolved, then distribution summaries.
    pub fn sections(&self) -> Vec<Section> {
        let s = &self.snapshot;
        let user_names: HashMap<i64, String> = s
            .users
            .iter()
            .filter_map(|u| u.id.map(|id| (id, u.full_name())))
            .collect();
        let lab_names: HashMap<i64, &str> = s.laboratories.iter().map(|l| (l.id, l.name.as_str())).collect();
        let equipment_names: HashMap<i64, &str> = s.equipment.iter().map(|e| (e.id, e.name.as_str())).collect();
        let category_names: HashMap<i64, &str> = s.categories.iter().map(|c| (c.id, c.name.as_str())).collect();

        let user = |id: Option<i64>| id.and_then(|id| user_names.get(&id).cloned());
        let lab = |id: Option<i64>| id.and_then(|id| lab_names.get(&id).map(|n| n.to_string()));
        let equipment = |id: Option<i64>| id.and_then(|id| equipment_names.get(&id).map(|n| n.to_string()));
        let date = |raw: &Option<String>| raw.as_deref().map(format_date);

        let mut sections = vec![
            Section::from_records(
                "Usuarios",
                &[
                    Column::new("ID", "usuario_id"),
                    Column::new("Nombre", "nombre"),
                    Column::new("Apellido", "apellido"),
                    Column::new("Email", "email"),
                    Column::new("Tipo", "tipo_usuario"),
                    Column::new("Identificación", "numero_identificacion"),
                ],
                &s.users,
            ),
            Section::from_records(
                "Laboratorios",
                &[
                    Column::new("ID", "laboratorio_id"),
                    Column::new("Nombre", "nombre"),
                    Column::new("Ubicación", "ubicacion"),
                    Column::new("Tipo", "tipo_laboratorio"),
                    Column::new("Capacidad", "capacidad"),
                ],
                &s.laboratories,
            ),
        ];

        let mut section = Section::new("Equipos", &["ID", "Nombre", "Código", "Categoría", "Estado"]);
        for e in &s.equipment {
            section.push_row(vec![
                Some(e.id.to_string()),
                Some(e.name.clone()),
                e.inventory_code.clone(),
                e.category_id.and_then(|id| category_names.get(&id).map(|n| n.to_string())),
                Some(e.status.clone()),
            ]);
        }
        sections.push(section);

        sections.push(Section::from_records(
            "Categorías",
            &[
                Column::new("ID", "categoria_id"),
                Column::new("Nombre", "nombre"),
                Column::new("Descripción", "descripcion"),
            ],
            &s.categories,
        ));

        let mut section = Section::new("Préstamos", &["ID", "Usuario", "Equipo", "Fecha Préstamo", "Estado"]);
        for l in &s.loans {
            section.push_row(vec![
                Some(l.id.to_string()),
                user(l.user_id),
                equipment(l.equipment_id),
                date(&l.loaned_on),
                Some(l.status.clone()),
            ]);
        }
        sections.push(section);

        let mut section = Section::new("Reservas", &["ID", "Laboratorio", "Usuario", "Fecha Inicio", "Estado"]);
        for r in &s.reservations {
            section.push_row(vec![
                Some(r.id.to_string()),
                lab(r.laboratory_id).or_else(|| r.laboratory_name.clone()),
                user(r.user_id),
                date(&r.starts_on),
                Some(r.status.clone()),
            ]);
        }
        sections.push(section);

        let mut section = Section::new("Mantenimientos", &["ID", "Equipo", "Fecha Inicio", "Técnico", "Costo"]);
        for m in &s.maintenance {
            section.push_row(vec![
                Some(m.id.to_string()),
                equipment(m.equipment_id),
                date(&m.started_on),
                m.technician.clone(),
                m.cost.map(|c| format!("{:.2}", c)),
            ]);
        }
        sections.push(section);

        let mut section = Section::new("Equipos más solicitados", &["Equipo", "Préstamos"]);
        for ranked in &self.report.most_requested {
            section.push_row(vec![Some(ranked.name.clone()), Some(ranked.count.to_string())]);
        }
        sections.push(section);

        let charts = self.report.charts();
        for (title, series) in [
            ("Usuarios por tipo", &charts.users),
            ("Laboratorios por tipo", &charts.laboratories),
            ("Equipos por categoría", &charts.equipment),
            ("Préstamos por estado", &charts.loans),
            ("Reservas por estado", &charts.reservations),
        ] {
            sections.push(summary_section(title, series));
        }

        sections
    }
}

/// Category / count / color table for one distribution.
pub fn summary_section(title: &str, series: &ChartSeries) -> Section {
    let mut section = Section::new(title, &["Categoría", "Cantidad", "Color"]);
    for segment in &series.segments {
        section.push_row(vec![
            Some(segment.name.clone()),
            Some(segment.count.to_string()),
            Some(segment.color.clone()),
        ]);
    }
    section
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory backend whose collections can be swapped between polls.
    #[derive(Default)]
    pub(crate) struct FakeInventoryApi {
        pub snapshot: Mutex<DashboardSnapshot>,
        pub fail_loans: Mutex<bool>,
        pub list_calls: AtomicUsize,
    }

    impl FakeInventoryApi {
        pub(crate) fn with_snapshot(snapshot: DashboardSnapshot) -> Arc<Self> {
            Arc::new(Self {
                snapshot: Mutex::new(snapshot),
                ..Default::default()
            })
        }

        fn read<T>(&self, pick: impl FnOnce(&DashboardSnapshot) -> T) -> T {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            pick(&self.snapshot.lock().unwrap())
        }
    }

    #[async_trait]
    impl LabApi for FakeInventoryApi {
        async fn login(&self, _credentials: &Credentials) -> ClientResult<User> {
            Err(ClientError::Backend { status: 501, message: "not used".to_string() })
        }

        async fn register(&self, _form: &RegistrationForm) -> ClientResult<User> {
            Err(ClientError::Backend { status: 501, message: "not used".to_string() })
        }

        async fn users(&self) -> ClientResult<Vec<User>> {
            Ok(self.read(|s| s.users.clone()))
        }

        async fn laboratories(&self) -> ClientResult<Vec<Laboratory>> {
            Ok(self.read(|s| s.laboratories.clone()))
        }

        async fn equipment(&self) -> ClientResult<Vec<Equipment>> {
            Ok(self.read(|s| s.equipment.clone()))
        }

        async fn categories(&self) -> ClientResult<Vec<EquipmentCategory>> {
            Ok(self.read(|s| s.categories.clone()))
        }

        async fn loans(&self) -> ClientResult<Vec<Loan>> {
            if *self.fail_loans.lock().unwrap() {
                return Err(ClientError::Backend { status: 500, message: "Error interno".to_string() });
            }
            Ok(self.read(|s| s.loans.clone()))
        }

        async fn reservations(&self) -> ClientResult<Vec<LabReservation>> {
            Ok(self.read(|s| s.reservations.clone()))
        }

        async fn maintenance(&self) -> ClientResult<Vec<MaintenanceRecord>> {
            Ok(self.read(|s| s.maintenance.clone()))
        }

        async fn user_loan_report(&self, _user_id: i64) -> ClientResult<LoanActivityReport> {
            Ok(LoanActivityReport::default())
        }

        async fn user_lab_report(&self, _user_id: i64) -> ClientResult<UserLabReport> {
            Ok(UserLabReport::default())
        }
    }

    pub(crate) fn sample_snapshot() -> DashboardSnapshot {
        serde_json::from_value(json!({
            "users": [
                { "usuario_id": 1, "nombre": "Ana", "apellido": "Rojas", "email": "ana@usb.edu", "tipo_usuario": "admin" },
                { "usuario_id": 2, "nombre": "Luis", "apellido": "Vargas", "email": "luis@usb.edu", "tipo_usuario": "estudiante" },
                { "usuario_id": 3, "nombre": "Eva", "apellido": "Paz", "email": "eva@usb.edu", "tipo_usuario": "estudiante" }
            ],
            "laboratories": [
                { "laboratorio_id": 10, "nombre": "Redes I", "tipo_laboratorio": "redes", "capacidad": 25 }
            ],
            "equipment": [
                { "equipo_id": 1, "nombre": "Osciloscopio", "categoria_id": 1, "estado": "disponible" },
                { "equipo_id": 2, "nombre": "Router", "categoria_id": 2, "estado": "en_uso" }
            ],
            "categories": [
                { "categoria_id": 1, "nombre": "Medición" },
                { "categoria_id": 2, "nombre": "Redes" }
            ],
            "loans": [
                { "prestamo_id": 1, "usuario_id": 2, "equipo_id": 1, "fecha_prestamo": "2024-05-03", "estado": "activo" },
                { "prestamo_id": 2, "usuario_id": 3, "equipo_id": 2, "estado": "devuelto" },
                { "prestamo_id": 3, "usuario_id": 2, "equipo_id": 1, "estado": "atrasado" }
            ],
            "reservations": [
                { "reserva_id": 1, "laboratorio_id": 10, "usuario_id": 3, "estado": "pendiente" }
            ],
            "maintenance": []
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_aggregates_snapshot() {
        let api = FakeInventoryApi::with_snapshot(sample_snapshot());
        let dashboard = Dashboard::load(api.as_ref()).await.unwrap();
        let report = &dashboard.report;

        assert_eq!(api.list_calls.load(Ordering::SeqCst), 7);
        assert_eq!(report.total_users, 3);
        assert_eq!(report.users_by_role.get("estudiante"), Some(2));
        assert_eq!(report.users_by_role.get("profesor"), Some(0));
        assert_eq!(report.labs_by_type.get("redes"), Some(1));
        assert_eq!(report.equipment_by_category.get("Medición"), Some(1));
        assert_eq!(report.equipment_by_status.get("en_uso"), Some(1));
        assert_eq!(report.loans_by_status.known_total(), 3);
        assert_eq!(report.reservations_by_status.get("pendiente"), Some(1));
        assert_eq!(
            report.most_requested[0],
            RankedEquipment { id: 1, name: "Osciloscopio".to_string(), count: 2 }
        );
        assert_eq!(report.charts().users.labels, vec!["Estudiante", "Profesor", "Personal", "Admin"]);
    }

    #[tokio::test]
    async fn test_any_failed_fetch_fails_the_round() {
        let api = FakeInventoryApi::with_snapshot(sample_snapshot());
        *api.fail_loans.lock().unwrap() = true;
        let err = Dashboard::load(api.as_ref()).await.unwrap_err();
        assert!(matches!(err, ClientError::Backend { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_dashboard_requires_admin() {
        let api = FakeInventoryApi::with_snapshot(sample_snapshot());
        let mut session = Session::new();
        session.complete_login(User {
            role: "personal".to_string(),
            ..sample_snapshot().users[0].clone()
        });

        let err = Dashboard::load_for_session(&session, api.as_ref(), Platform::Web).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(_)));
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_document_resolves_names_and_skips_empty_sections() {
        let doc = Dashboard::from_snapshot(sample_snapshot()).document();

        assert!(doc.section("Mantenimientos").is_none());
        let loans = doc.section("Préstamos").unwrap();
        assert_eq!(loans.rows[0], vec!["1", "Luis Vargas", "Osciloscopio", "03/05/2024", "activo"]);
        assert_eq!(loans.rows[1][3], "N/A");

        let reservations = doc.section("Reservas").unwrap();
        assert_eq!(reservations.rows[0][1], "Redes I");

        let summary = doc.section("Préstamos por estado").unwrap();
        assert_eq!(summary.header, vec!["Categoría", "Cantidad", "Color"]);
        assert_eq!(summary.rows[0], vec!["Activo", "1", "#1e90ff"]);

        let ranked = doc.section("Equipos más solicitados").unwrap();
        assert_eq!(ranked.rows, vec![vec!["Osciloscopio", "2"], vec!["Router", "1"]]);
    }

    #[test]
    fn test_empty_snapshot_has_only_summaries() {
        let doc = Dashboard::from_snapshot(DashboardSnapshot::default()).document();
        assert!(doc.section("Usuarios").is_none());
        // Known categories still render with zero counts.
        assert_eq!(doc.section("Usuarios por tipo").unwrap().rows.len(), 4);
        assert!(doc.section("Equipos por categoría").is_none());
    }
}
