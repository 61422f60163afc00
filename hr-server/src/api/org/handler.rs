//! Org chart API Handlers

use std::collections::HashMap;

use axum::{Json, extract::State};
use serde::Serialize;
use shared::models::{Department, Employee, Position};

use crate::core::ServerState;
use crate::utils::AppResult;

/// Group label for employees without a position
const NO_POSITION: &str = "Без должности";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgEmployee {
    pub id: u64,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgPosition {
    pub id: Option<u64>,
    pub name: String,
    pub employees: Vec<OrgEmployee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgDepartment {
    pub id: u64,
    pub name: String,
    pub parent_department_id: Option<u64>,
    pub positions: Vec<OrgPosition>,
}

/// One entry per department; its employees grouped by position in the
/// order the positions first appear. Employees without a department are
/// left out.
fn build_tree(
    departments: Vec<Department>,
    positions: &[Position],
    employees: Vec<Employee>,
) -> Vec<OrgDepartment> {
    let position_names: HashMap<u64, &str> =
        positions.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut by_department: HashMap<u64, Vec<OrgPosition>> = HashMap::new();
    for employee in employees {
        let Some(department_id) = employee.department_id else {
            continue;
        };
        let groups = by_department.entry(department_id).or_default();
        let index = match groups.iter().position(|g| g.id == employee.position_id) {
            Some(index) => index,
            None => {
                let name = employee
                    .position_id
                    .and_then(|id| position_names.get(&id).copied())
                    .unwrap_or(NO_POSITION);
                groups.push(OrgPosition {
                    id: employee.position_id,
                    name: name.to_string(),
                    employees: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[index].employees.push(OrgEmployee {
            id: employee.id,
            full_name: employee.full_name,
        });
    }

    departments
        .into_iter()
        .map(|d| OrgDepartment {
            positions: by_department.remove(&d.id).unwrap_or_default(),
            id: d.id,
            name: d.name,
            parent_department_id: d.parent_department_id,
        })
        .collect()
}

/// GET /api/org - org chart
pub async fn tree(State(state): State<ServerState>) -> AppResult<Json<Vec<OrgDepartment>>> {
    let positions: Vec<Position> = state.store.list()?;
    Ok(Json(build_tree(
        state.store.list()?,
        &positions,
        state.store.list()?,
    )))
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::api::test_support::*;

    fn employee(id: u64, name: &str, department_id: Option<u64>, position_id: Option<u64>) -> Employee {
        Employee {
            id,
            department_id,
            position_id,
            ..Employee::new(name)
        }
    }

    #[test]
    fn test_build_tree_groups_by_position() {
        let mut sales = Department::new("Отдел продаж");
        sales.id = 1;
        let mut it = Department::new("ИТ");
        it.id = 2;
        it.parent_department_id = Some(1);
        let mut manager = Position::new("Менеджер");
        manager.id = 10;

        let tree = build_tree(
            vec![sales, it],
            &[manager],
            vec![
                employee(1, "Иванов Иван", Some(1), Some(10)),
                employee(2, "Петров Пётр", Some(1), None),
                employee(3, "Сидорова Анна", Some(1), Some(10)),
                employee(4, "Без отдела", None, Some(10)),
                employee(5, "Кузнецов Олег", Some(1), Some(99)),
            ],
        );

        assert_eq!(tree.len(), 2);
        let groups = &tree[0].positions;
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name, "Менеджер");
        assert_eq!(
            groups[0].employees.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(groups[1].id, None);
        assert_eq!(groups[1].name, NO_POSITION);
        // Unknown position id keeps its id but gets the fallback name
        assert_eq!(groups[2].id, Some(99));
        assert_eq!(groups[2].name, NO_POSITION);

        assert_eq!(tree[1].parent_department_id, Some(1));
        assert!(tree[1].positions.is_empty());
    }

    #[tokio::test]
    async fn test_org_route() {
        let state = state();
        let (_, dept) = call(&state, "POST", "/api/departments", Some("hr"), Some(json!({"name": "Склад"}))).await;
        let body = json!({"full_name": "Орлова Мария", "department_id": dept["id"]});
        call(&state, "POST", "/api/employees", Some("hr"), Some(body)).await;

        let (status, tree) = call(&state, "GET", "/api/org", Some("manager"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tree[0]["name"], "Склад");
        assert_eq!(tree[0]["positions"][0]["name"], NO_POSITION);
        assert_eq!(tree[0]["positions"][0]["employees"][0]["full_name"], "Орлова Мария");

        let (status, _) = call(&state, "GET", "/api/org", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
