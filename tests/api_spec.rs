use audit_tracker::api::{create_router, ErrorResponse, MessageResponse, MAX_CSV_UPLOAD_BYTES};
use audit_tracker::db::Database;
use audit_tracker::models::*;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_client(server: &TestServer) -> Client {
    server
        .post("/api/v1/clients")
        .json(&json!({ "name": "Acme Corp", "industry": "Retail" }))
        .await
        .json::<Client>()
}

async fn create_test_project(server: &TestServer) -> Project {
    server
        .post("/api/v1/projects")
        .json(&json!({ "name": "Audit 2024", "clientName": "Acme" }))
        .await
        .json::<Project>()
}

async fn create_test_user(server: &TestServer, email: &str) -> User {
    server
        .post("/api/v1/users")
        .json(&json!({ "name": "Alice", "email": email, "role": "CONSULTANT", "password": "pw" }))
        .await
        .json::<User>()
}

async fn create_test_requirement(server: &TestServer, project_id: i64) -> Requirement {
    server
        .post(&format!("/api/v1/projects/{}/requirements", project_id))
        .json(&json!({ "text": "Must log access" }))
        .await
        .json::<Requirement>()
}

async fn create_test_audit_task(server: &TestServer, requirement_id: i64) -> AuditTask {
    server
        .post(&format!("/api/v1/requirements/{}/audit-tasks", requirement_id))
        .json(&json!({ "text": "Review logs" }))
        .await
        .json::<AuditTask>()
}

fn csv_form(contents: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(contents.as_bytes().to_vec())
            .file_name("requirements.csv")
            .mime_type("text/csv"),
    )
}

mod index {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let server = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    #[tokio::test]
    async fn lists_endpoints() {
        let server = setup();

        let response = server.get("/api/v1").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["endpoints"]["audit-tasks"], "/api/v1/audit-tasks");
    }
}

mod clients {
    use super::*;

    #[tokio::test]
    async fn creates_a_client_in_camel_case() {
        let server = setup();

        let response = server
            .post("/api/v1/clients")
            .json(&json!({ "name": "Acme", "contactName": "Jo", "contactEmail": "jo@acme.test" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["contactName"], "Jo");
        assert!(body.get("users").is_none());
        assert!(body.get("industry").is_none());
    }

    #[tokio::test]
    async fn rejects_an_empty_name() {
        let server = setup();

        let response = server
            .post("/api/v1/clients")
            .json(&json!({ "name": "" }))
            .await;

        response.assert_status_bad_request();
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, 400);
    }

    #[tokio::test]
    async fn get_omits_empty_relations_and_includes_loaded_ones() {
        let server = setup();
        let client = create_test_client(&server).await;
        server
            .post("/api/v1/projects")
            .json(&json!({ "name": "P", "clientName": "Acme", "clientId": client.id }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get(&format!("/api/v1/clients/{}", client.id)).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["projects"].as_array().map(|p| p.len()), Some(1));
        assert!(body.get("users").is_none());
    }

    #[tokio::test]
    async fn update_keeps_other_fields_and_loads_no_relations() {
        let server = setup();
        let client = create_test_client(&server).await;
        server
            .post("/api/v1/users")
            .json(&json!({ "name": "Bo", "email": "bo@acme.test", "role": "CLIENT", "clientId": client.id }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .put(&format!("/api/v1/clients/{}", client.id))
            .json(&json!({ "contactName": "Jo" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["contactName"], "Jo");
        assert_eq!(body["name"], "Acme Corp");
        assert_eq!(body["industry"], "Retail");
        assert!(body.get("users").is_none());

        let stored: Value = server
            .get(&format!("/api/v1/clients/{}", client.id))
            .await
            .json();
        assert_eq!(stored["industry"], "Retail");
        assert_eq!(stored["users"].as_array().map(|u| u.len()), Some(1));
    }

    #[tokio::test]
    async fn returns_404_with_error_body() {
        let server = setup();

        let response = server.get("/api/v1/clients/999").await;

        response.assert_status_not_found();
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "Client not found");
        assert_eq!(error.code, 404);
    }

    #[tokio::test]
    async fn rejects_a_non_numeric_id() {
        let server = setup();

        let response = server.get("/api/v1/clients/abc").await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "Invalid ID");
    }

    #[tokio::test]
    async fn deletes_with_a_message() {
        let server = setup();
        let client = create_test_client(&server).await;

        let response = server.delete(&format!("/api/v1/clients/{}", client.id)).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<MessageResponse>().message,
            "Client deleted successfully"
        );
        server
            .delete(&format!("/api/v1/clients/{}", client.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn lists_client_users_and_projects() {
        let server = setup();
        let client = create_test_client(&server).await;
        server
            .post("/api/v1/users")
            .json(&json!({ "name": "Cy", "email": "cy@acme.test", "role": "CLIENT", "clientId": client.id }))
            .await
            .assert_status(StatusCode::CREATED);

        let users = server
            .get(&format!("/api/v1/clients/{}/users", client.id))
            .await
            .json::<Vec<User>>();
        let projects = server
            .get(&format!("/api/v1/clients/{}/projects", client.id))
            .await
            .json::<Vec<Project>>();

        assert_eq!(users.len(), 1);
        assert!(projects.is_empty());
        server
            .get("/api/v1/clients/999/users")
            .await
            .assert_status_not_found();
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn never_exposes_the_password_hash() {
        let server = setup();

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "name": "Al", "email": "al@example.com", "role": "ADMIN", "password": "secret" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["role"], "ADMIN");
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn rejects_an_unknown_role() {
        let server = setup();

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "name": "Al", "email": "al@example.com", "role": "OWNER" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "Invalid request");
    }

    #[tokio::test]
    async fn rejects_a_missing_client() {
        let server = setup();

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "name": "Al", "email": "al@example.com", "role": "CLIENT", "clientId": 12 }))
            .await;

        response.assert_status_not_found();
        let users = server.get("/api/v1/users").await.json::<Vec<User>>();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn filters_by_query_parameters() {
        let server = setup();
        create_test_user(&server, "one@example.com").await;
        create_test_user(&server, "two@example.com").await;

        let users = server
            .get("/api/v1/users")
            .add_query_param("email", "two@example.com")
            .await
            .json::<Vec<User>>();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "two@example.com");
    }

    #[tokio::test]
    async fn get_includes_assigned_projects() {
        let server = setup();
        let user = create_test_user(&server, "a@example.com").await;
        let project = create_test_project(&server).await;
        server
            .post(&format!("/api/v1/projects/{}/users/{}", project.id, user.id))
            .await
            .assert_status_ok();

        let body: Value = server.get(&format!("/api/v1/users/{}", user.id)).await.json();

        assert_eq!(body["projects"][0]["id"], project.id);
        assert!(body.get("client").is_none());
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let server = setup();
        let user = create_test_user(&server, "a@example.com").await;

        let response = server
            .put(&format!("/api/v1/users/{}", user.id))
            .json(&json!({ "name": "Renamed" }))
            .await;

        response.assert_status_ok();
        let updated: User = response.json();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.role, Role::Consultant);
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn logs_in_with_a_mock_token() {
        let server = setup();
        let user = create_test_user(&server, "alice@example.com").await;

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "email": "alice@example.com", "password": "pw" }))
            .await;

        response.assert_status_ok();
        let login: LoginResponse = response.json();
        assert_eq!(login.token, format!("mock-token-{}", user.id));
        assert_eq!(login.user.id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let server = setup();
        create_test_user(&server, "alice@example.com").await;

        let wrong_password = server
            .post("/api/v1/auth/login")
            .json(&json!({ "email": "alice@example.com", "password": "nope" }))
            .await;
        let unknown_email = server
            .post("/api/v1/auth/login")
            .json(&json!({ "email": "bob@example.com", "password": "pw" }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_email.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_password.json::<Value>(),
            unknown_email.json::<Value>()
        );
        assert_eq!(
            wrong_password.json::<ErrorResponse>().error,
            "Invalid credentials"
        );
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn defaults_status_to_new() {
        let server = setup();

        let project = create_test_project(&server).await;

        assert_eq!(project.status, "NEW");
    }

    #[tokio::test]
    async fn archives_idempotently() {
        let server = setup();
        let project = create_test_project(&server).await;

        for _ in 0..2 {
            let response = server
                .post(&format!("/api/v1/projects/{}/archive", project.id))
                .await;
            response.assert_status_ok();
            assert_eq!(response.json::<Project>().status, "ARCHIVED");
        }

        server
            .post("/api/v1/projects/999/archive")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn update_and_archive_return_the_written_row_only() {
        let server = setup();
        let client = create_test_client(&server).await;
        let project: Project = server
            .post("/api/v1/projects")
            .json(&json!({ "name": "Audit", "clientName": "Acme", "clientId": client.id }))
            .await
            .json();
        let user = create_test_user(&server, "a@example.com").await;
        server
            .post(&format!("/api/v1/projects/{}/users/{}", project.id, user.id))
            .await
            .assert_status_ok();
        create_test_requirement(&server, project.id).await;

        let updated = server
            .put(&format!("/api/v1/projects/{}", project.id))
            .json(&json!({ "name": "Renamed" }))
            .await;
        updated.assert_status_ok();
        let body: Value = updated.json();
        assert_eq!(body["name"], "Renamed");
        assert_eq!(body["clientId"], client.id);
        for relation in ["client", "users", "requirements"] {
            assert!(body.get(relation).is_none(), "unexpected {relation}");
        }

        let archived: Value = server
            .post(&format!("/api/v1/projects/{}/archive", project.id))
            .await
            .json();
        assert_eq!(archived["status"], "ARCHIVED");
        for relation in ["client", "users", "requirements"] {
            assert!(archived.get(relation).is_none(), "unexpected {relation}");
        }
    }

    #[tokio::test]
    async fn list_does_not_load_relations() {
        let server = setup();
        let project = create_test_project(&server).await;
        create_test_requirement(&server, project.id).await;

        let body: Value = server.get("/api/v1/projects").await.json();

        assert_eq!(body.as_array().map(|p| p.len()), Some(1));
        assert!(body[0].get("requirements").is_none());
    }

    #[tokio::test]
    async fn get_loads_requirements() {
        let server = setup();
        let project = create_test_project(&server).await;
        create_test_requirement(&server, project.id).await;

        let body: Value = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .json();

        assert_eq!(body["requirements"][0]["status"], "NOT_MET");
        assert!(body.get("users").is_none());
        assert!(body.get("client").is_none());
    }

    #[tokio::test]
    async fn filters_by_status() {
        let server = setup();
        let archived = create_test_project(&server).await;
        create_test_project(&server).await;
        server
            .post(&format!("/api/v1/projects/{}/archive", archived.id))
            .await;

        let projects = server
            .get("/api/v1/projects?status=ARCHIVED")
            .await
            .json::<Vec<Project>>();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, archived.id);
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let server = setup();

        let response = server
            .post("/api/v1/projects")
            .content_type("application/json")
            .bytes("{ not json".into())
            .await;

        response.assert_status_bad_request();
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "Invalid request");
        assert!(error.message.is_some());
    }
}

mod assignments {
    use super::*;

    #[tokio::test]
    async fn assigning_twice_keeps_one_link() {
        let server = setup();
        let project = create_test_project(&server).await;
        let user = create_test_user(&server, "a@example.com").await;
        let path = format!("/api/v1/projects/{}/users/{}", project.id, user.id);

        server.post(&path).await.assert_status_ok();
        let response = server.post(&path).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<MessageResponse>().message,
            "User assigned to project successfully"
        );
        let users = server
            .get(&format!("/api/v1/projects/{}/users", project.id))
            .await
            .json::<Vec<User>>();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn project_users_include_their_client() {
        let server = setup();
        let client = create_test_client(&server).await;
        let project = create_test_project(&server).await;
        let user = server
            .post("/api/v1/users")
            .json(&json!({ "name": "Cy", "email": "cy@acme.test", "role": "CLIENT", "clientId": client.id }))
            .await
            .json::<User>();
        server
            .post(&format!("/api/v1/projects/{}/users/{}", project.id, user.id))
            .await;

        let body: Value = server
            .get(&format!("/api/v1/projects/{}/users", project.id))
            .await
            .json();

        assert_eq!(body[0]["client"]["name"], "Acme Corp");
    }

    #[tokio::test]
    async fn unassigning_a_missing_link_succeeds() {
        let server = setup();
        let project = create_test_project(&server).await;
        let user = create_test_user(&server, "a@example.com").await;

        let response = server
            .delete(&format!("/api/v1/projects/{}/users/{}", project.id, user.id))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<MessageResponse>().message,
            "User removed from project successfully"
        );
    }

    #[tokio::test]
    async fn requires_an_existing_user() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/users/77", project.id))
            .await;

        response.assert_status_not_found();
        assert_eq!(response.json::<ErrorResponse>().error, "User not found");
    }
}

mod requirements {
    use super::*;

    #[tokio::test]
    async fn creates_under_a_project_with_default_status() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/requirements", project.id))
            .json(&json!({ "text": "Encrypt backups", "category": "Security" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let requirement: Requirement = response.json();
        assert_eq!(requirement.project_id, project.id);
        assert_eq!(requirement.status, RequirementStatus::NotMet);
    }

    #[tokio::test]
    async fn keeps_an_explicit_status() {
        let server = setup();
        let project = create_test_project(&server).await;

        let requirement = server
            .post(&format!("/api/v1/projects/{}/requirements", project.id))
            .json(&json!({ "text": "Draft", "status": "DRAFT" }))
            .await
            .json::<Requirement>();

        assert_eq!(requirement.status, RequirementStatus::Draft);
    }

    #[tokio::test]
    async fn rejects_an_unknown_status() {
        let server = setup();
        let project = create_test_project(&server).await;

        server
            .post(&format!("/api/v1/projects/{}/requirements", project.id))
            .json(&json!({ "text": "Bad", "status": "MAYBE" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn creating_under_a_missing_project_persists_nothing() {
        let server = setup();

        let response = server
            .post("/api/v1/projects/999/requirements")
            .json(&json!({ "text": "Orphan" }))
            .await;

        response.assert_status_not_found();
        assert_eq!(response.json::<ErrorResponse>().error, "Project not found");
        let all = server
            .get("/api/v1/requirements")
            .await
            .json::<Vec<Requirement>>();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn loads_audit_tasks_only_when_present() {
        let server = setup();
        let project = create_test_project(&server).await;
        let with_task = create_test_requirement(&server, project.id).await;
        create_test_requirement(&server, project.id).await;
        create_test_audit_task(&server, with_task.id).await;

        let body: Value = server
            .get(&format!("/api/v1/projects/{}/requirements", project.id))
            .await
            .json();

        assert_eq!(body[0]["auditTasks"].as_array().map(|t| t.len()), Some(1));
        assert!(body[1].get("auditTasks").is_none());
    }

    #[tokio::test]
    async fn update_omits_audit_tasks() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        create_test_audit_task(&server, requirement.id).await;

        let response = server
            .put(&format!("/api/v1/requirements/{}", requirement.id))
            .json(&json!({ "category": "Logging" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["category"], "Logging");
        assert_eq!(body["text"], "Must log access");
        assert!(body.get("auditTasks").is_none());
    }

    #[tokio::test]
    async fn filters_by_status() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        create_test_requirement(&server, project.id).await;
        server
            .put(&format!("/api/v1/requirements/{}", requirement.id))
            .json(&json!({ "status": "MET" }))
            .await
            .assert_status_ok();

        let met = server
            .get("/api/v1/requirements")
            .add_query_param("status", "MET")
            .await
            .json::<Vec<Requirement>>();

        assert_eq!(met.len(), 1);
        assert_eq!(met[0].text, "Must log access");
    }
}

mod audit_tasks {
    use super::*;

    #[tokio::test]
    async fn defaults_status_to_pending() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;

        let task = create_test_audit_task(&server, requirement.id).await;

        assert_eq!(task.status, "PENDING");
        assert_eq!(task.requirement_id, requirement.id);
    }

    #[tokio::test]
    async fn get_includes_its_issue() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        let task = create_test_audit_task(&server, requirement.id).await;
        server
            .post(&format!("/api/v1/audit-tasks/{}/issues", task.id))
            .json(&json!({ "title": "Gap found" }))
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = server
            .get(&format!("/api/v1/audit-tasks/{}", task.id))
            .await
            .json();

        assert_eq!(body["issue"]["title"], "Gap found");
    }

    #[tokio::test]
    async fn update_omits_the_issue() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        let task = create_test_audit_task(&server, requirement.id).await;
        server
            .post(&format!("/api/v1/audit-tasks/{}/issues", task.id))
            .json(&json!({ "title": "Gap found" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .put(&format!("/api/v1/audit-tasks/{}", task.id))
            .json(&json!({ "status": "DONE" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "DONE");
        assert_eq!(body["text"], "Review logs");
        assert!(body.get("issue").is_none());
    }

    #[tokio::test]
    async fn missing_requirement_is_404() {
        let server = setup();

        server
            .get("/api/v1/requirements/5/audit-tasks")
            .await
            .assert_status_not_found();
        server
            .post("/api/v1/requirements/5/audit-tasks")
            .json(&json!({ "text": "Orphan" }))
            .await
            .assert_status_not_found();
    }
}

mod issues {
    use super::*;

    #[tokio::test]
    async fn defaults_status_and_type() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        let task = create_test_audit_task(&server, requirement.id).await;

        let response = server
            .post(&format!("/api/v1/audit-tasks/{}/issues", task.id))
            .json(&json!({ "title": "Gap", "estimateHrs": 3 }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["status"], "OPEN");
        assert_eq!(body["type"], "DEFECT");
        assert_eq!(body["estimateHrs"], 3);
    }

    #[tokio::test]
    async fn rejects_a_negative_estimate() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        let task = create_test_audit_task(&server, requirement.id).await;

        server
            .post(&format!("/api/v1/audit-tasks/{}/issues", task.id))
            .json(&json!({ "title": "Gap", "estimateHrs": -1 }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn lists_issues_across_a_project() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        let task = create_test_audit_task(&server, requirement.id).await;
        for title in ["One", "Two"] {
            server
                .post(&format!("/api/v1/audit-tasks/{}/issues", task.id))
                .json(&json!({ "title": title }))
                .await;
        }

        let issues = server
            .get(&format!("/api/v1/projects/{}/issues", project.id))
            .await
            .json::<Vec<Issue>>();

        assert_eq!(issues.len(), 2);
        server
            .get("/api/v1/projects/999/issues")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn updates_and_deletes() {
        let server = setup();
        let project = create_test_project(&server).await;
        let requirement = create_test_requirement(&server, project.id).await;
        let task = create_test_audit_task(&server, requirement.id).await;
        let issue = server
            .post(&format!("/api/v1/audit-tasks/{}/issues", task.id))
            .json(&json!({ "title": "Gap", "priority": "LOW" }))
            .await
            .json::<Issue>();

        let updated = server
            .put(&format!("/api/v1/issues/{}", issue.id))
            .json(&json!({ "status": "CLOSED" }))
            .await
            .json::<Issue>();
        assert_eq!(updated.status, "CLOSED");
        assert_eq!(updated.priority.as_deref(), Some("LOW"));

        server
            .delete(&format!("/api/v1/issues/{}", issue.id))
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/v1/issues/{}", issue.id))
            .await
            .assert_status_not_found();
    }
}

mod uploads {
    use super::*;

    #[tokio::test]
    async fn imports_requirements_from_csv() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/uploads/requirements-csv/{}", project.id))
            .multipart(csv_form("Encrypt data,Security\nKeep logs,\n,skipped\n"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let import: RequirementImport = response.json();
        assert_eq!(import.message, "Requirements uploaded successfully");
        assert_eq!(import.count, 2);
        assert_eq!(import.requirements[0].category.as_deref(), Some("Security"));
        assert!(import.requirements[1].category.is_none());
        assert!(import
            .requirements
            .iter()
            .all(|r| r.status == RequirementStatus::NotMet));
    }

    #[tokio::test]
    async fn missing_project_is_404_and_imports_nothing() {
        let server = setup();

        let response = server
            .post("/api/v1/uploads/requirements-csv/999")
            .multipart(csv_form("Something\n"))
            .await;

        response.assert_status_not_found();
        let all = server
            .get("/api/v1/requirements")
            .await
            .json::<Vec<Requirement>>();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn requires_a_file_field() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/uploads/requirements-csv/{}", project.id))
            .multipart(MultipartForm::new().add_text("notes", "no file here"))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "No file uploaded");
    }

    #[tokio::test]
    async fn accepts_files_above_the_default_body_limit() {
        let server = setup();
        let project = create_test_project(&server).await;
        let long_text = "x".repeat(3 * 1024 * 1024);

        let response = server
            .post(&format!("/api/v1/uploads/requirements-csv/{}", project.id))
            .multipart(csv_form(&format!("{long_text},Bulk\n")))
            .await;

        response.assert_status(StatusCode::CREATED);
        let import: RequirementImport = response.json();
        assert_eq!(import.count, 1);
        assert_eq!(import.requirements[0].text.len(), long_text.len());
    }

    #[tokio::test]
    async fn oversized_file_is_413_not_a_missing_file() {
        let server = setup();
        let project = create_test_project(&server).await;
        let too_big = "y".repeat(MAX_CSV_UPLOAD_BYTES + 1);

        let response = server
            .post(&format!("/api/v1/uploads/requirements-csv/{}", project.id))
            .multipart(csv_form(&too_big))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "File too large");
        assert_eq!(error.code, 413);
    }

    #[tokio::test]
    async fn mismatched_field_count_is_a_csv_error() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/uploads/requirements-csv/{}", project.id))
            .multipart(csv_form("Must encrypt,Security\nMust log\n"))
            .await;

        response.assert_status_bad_request();
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "Error reading CSV");
        assert!(error
            .message
            .unwrap_or_default()
            .contains("wrong number of fields"));
    }

    #[tokio::test]
    async fn malformed_csv_keeps_earlier_rows() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/uploads/requirements-csv/{}", project.id))
            .multipart(csv_form("Good row\n\"never closed\n"))
            .await;

        response.assert_status_bad_request();
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "Error reading CSV");
        assert!(error.message.unwrap_or_default().contains("line 2"));

        let all = server
            .get(&format!("/api/v1/projects/{}/requirements", project.id))
            .await
            .json::<Vec<Requirement>>();
        assert_eq!(all.len(), 1);
    }
}
