use actix_web::{web, App, HttpResponse, HttpServer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use student_predictor::analytics::{grade_counts, GradeEntry, SubjectAnalysis, SubjectAnalyzer};
use student_predictor::catalog::{CourseCatalog, StaticCatalog};
use student_predictor::db::{Database, NewPrediction, PredictionRecord};
use student_predictor::error::PredictorError;
use student_predictor::estimator;
use student_predictor::grades::LetterGrade;
use student_predictor::recommend::{
    first_term_recommendations, forecast_recommendations, Recommendation,
};
use student_predictor::service::{
    HttpModelService, MarksGroup, ModelForecast, ModelOutcome, ModelService, ReportPayload,
    SemesterForecast,
};
use student_predictor::sgpa::{semester_results, SemesterResult};
use student_predictor::validate;
use student_predictor::whatif::{self, GradeImprovement, WhatIfBaseline, WhatIfOutcome};

struct AppState {
    catalog: Arc<dyn CourseCatalog>,
    model: Arc<dyn ModelService>,
    db: Database,
    baseline: Mutex<Option<WhatIfBaseline>>,
}

#[derive(Deserialize)]
struct PredictBody {
    student_name: String,
    department: String,
    semester_count: u8,
    /// Per-semester grade entries, aligned to the catalog's course order.
    #[serde(default)]
    grades: BTreeMap<u8, Vec<Option<String>>>,
    /// Current-semester attendance percentages, same alignment.
    #[serde(default)]
    attendance: Vec<Option<f64>>,
    /// Current-semester midterm marks out of 50, same alignment.
    #[serde(default)]
    midterm: Vec<Option<f64>>,
}

#[derive(Serialize)]
struct FirstTermResponse {
    sgpa: f64,
    pass_probability: u8,
    risk: &'static str,
    insight: String,
    projections: Vec<SemesterForecast>,
    recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
struct ForecastResponse {
    semesters: Vec<SemesterResult>,
    forecast: ModelForecast,
    subjects: Vec<SubjectAnalysis>,
    grade_counts: BTreeMap<char, u32>,
    recommendations: Vec<Recommendation>,
    /// Set when any semester SGPA is below 2.4 or any F was recorded.
    warning: bool,
}

#[derive(Deserialize)]
struct WhatIfBody {
    attendance: f64,
    midterm: f64,
    grade_improvement: GradeImprovement,
}

#[derive(Deserialize)]
struct ReportBody {
    student_name: String,
    department: String,
    current_average: f64,
    trend: String,
    semesters: Vec<SemesterResult>,
    predictions: Vec<SemesterForecast>,
    risk: String,
    insight: String,
    #[serde(default)]
    features: Vec<String>,
}

#[derive(Serialize)]
struct HistoryResponse {
    student_name: String,
    predictions: Vec<PredictionRecord>,
}

fn mean_marks(group: &MarksGroup) -> f64 {
    let sum: f64 = group.marks.values().sum();
    sum / group.marks.len() as f64
}

fn set_baseline(state: &AppState, current_average: f64) {
    let mut guard = state
        .baseline
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(WhatIfBaseline { current_average });
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("Student Predictor API is running!")
}

async fn get_metrics(state: web::Data<AppState>) -> Result<HttpResponse, PredictorError> {
    let metrics = state.model.metrics().await?;
    Ok(HttpResponse::Ok().json(metrics))
}

async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictBody>,
) -> Result<HttpResponse, PredictorError> {
    let body = body.into_inner();
    validate::validate_semester_count(body.semester_count)?;
    let catalog = state.catalog.as_ref();

    let attendance = validate::validate_attendance(
        catalog,
        &body.department,
        body.semester_count,
        &body.attendance,
    )?;
    let midterm = validate::validate_midterm(
        catalog,
        &body.department,
        body.semester_count,
        &body.midterm,
    )?;

    let semesters = semester_results(catalog, &body.department, body.semester_count, &|s| {
        body.grades
            .get(&s)
            .map(|entries| validate::parse_grades(entries))
            .unwrap_or_default()
    });

    // No completed semester to learn from: fall back to the fixed-weight
    // first-term estimate instead of calling the model. The grade groups
    // are not validated on this path; an entirely blank history is exactly
    // what selects it.
    if body.semester_count <= 1 || semesters.is_empty() {
        // The estimate has no other inputs, so here both groups are required.
        let attendance = attendance.ok_or_else(|| {
            PredictorError::IncompleteData(format!(
                "No courses found for {} semester {}",
                body.department, body.semester_count
            ))
        })?;
        let midterm = midterm.ok_or_else(|| {
            PredictorError::IncompleteData(format!(
                "No courses found for {} semester {}",
                body.department, body.semester_count
            ))
        })?;
        let mean_attendance = mean_marks(&attendance);
        let mean_midterm = mean_marks(&midterm);
        let estimate = estimator::estimate(mean_attendance, mean_midterm);
        let risk = estimator::risk_label(estimate.sgpa);

        set_baseline(&state, estimate.sgpa);
        state
            .db
            .save_prediction(&NewPrediction {
                student_name: body.student_name.clone(),
                department: body.department.clone(),
                current_average: estimate.sgpa,
                predicted_sgpa: estimate.sgpa,
                risk: risk.to_string(),
            })
            .await?;

        let response = FirstTermResponse {
            sgpa: estimate.sgpa,
            pass_probability: estimate.pass_probability,
            risk,
            insight: estimator::insight(mean_attendance, mean_midterm),
            projections: estimator::project_remaining(estimate, body.semester_count.max(1)),
            recommendations: first_term_recommendations(
                mean_attendance,
                mean_midterm,
                estimate.sgpa,
            ),
        };
        return Ok(HttpResponse::Ok().json(response));
    }

    let subject_grades = validate::validate_grades(
        catalog,
        &body.department,
        body.semester_count,
        &body.grades,
    )?;

    // The current-semester groups are optional on this path: when the
    // catalog has no courses for the current semester they are simply
    // omitted from the payload.
    let mean_attendance = attendance.as_ref().map(mean_marks);
    let mean_midterm = midterm.as_ref().map(mean_marks);

    let request = validate::build_request(
        &body.student_name,
        &body.department,
        semesters.clone(),
        subject_grades,
        attendance,
        midterm,
    );

    let forecast = match state.model.predict(&request).await? {
        ModelOutcome::Forecast(forecast) => forecast,
        ModelOutcome::Failure(message) => return Err(PredictorError::Model(message)),
    };

    let mut entries = Vec::new();
    let mut all_grades = Vec::new();
    for semester in 1..body.semester_count {
        let courses = catalog.courses(&body.department, semester);
        let parsed = body
            .grades
            .get(&semester)
            .map(|raw| validate::parse_grades(raw))
            .unwrap_or_default();
        for (course, grade) in courses.iter().zip(parsed.into_iter()) {
            if let Some(grade) = grade {
                entries.push(GradeEntry {
                    semester,
                    subject: course.title.clone(),
                    grade,
                });
                all_grades.push(grade);
            }
        }
    }

    let analyzer = SubjectAnalyzer::new();
    let subjects = analyzer.analyze(&entries);
    let weak: Vec<String> = analyzer
        .needs_attention(&subjects)
        .iter()
        .map(|s| s.subject.clone())
        .collect();

    let warning = semesters.iter().any(|r| r.sgpa < 2.4)
        || all_grades.iter().any(|g| *g == LetterGrade::F);

    set_baseline(&state, forecast.current_average);
    state
        .db
        .save_prediction(&NewPrediction {
            student_name: body.student_name.clone(),
            department: body.department.clone(),
            current_average: forecast.current_average,
            predicted_sgpa: forecast
                .predictions
                .last()
                .map(|p| p.predicted_sgpa)
                .unwrap_or(forecast.current_average),
            risk: forecast.risk.clone(),
        })
        .await?;

    let response = ForecastResponse {
        semesters,
        recommendations: forecast_recommendations(
            forecast.current_average,
            mean_attendance,
            mean_midterm,
            &weak,
        ),
        grade_counts: grade_counts(all_grades.iter()),
        subjects,
        forecast,
        warning,
    };
    Ok(HttpResponse::Ok().json(response))
}

async fn what_if(
    state: web::Data<AppState>,
    body: web::Json<WhatIfBody>,
) -> Result<HttpResponse, PredictorError> {
    let body = body.into_inner();
    if !(0.0..=100.0).contains(&body.attendance) {
        return Err(PredictorError::Validation(
            validate::ATTENDANCE_MESSAGE.to_string(),
        ));
    }
    if !(0.0..=50.0).contains(&body.midterm) {
        return Err(PredictorError::Validation(
            validate::MIDTERM_MESSAGE.to_string(),
        ));
    }

    let baseline = {
        let guard = state
            .baseline
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.ok_or(PredictorError::MissingBaseline)?
    };

    let outcome: WhatIfOutcome = whatif::simulate(
        &baseline,
        body.attendance,
        body.midterm,
        body.grade_improvement,
    );
    Ok(HttpResponse::Ok().json(outcome))
}

async fn download_report(
    state: web::Data<AppState>,
    body: web::Json<ReportBody>,
) -> Result<HttpResponse, PredictorError> {
    let body = body.into_inner();
    let payload = ReportPayload {
        student_name: body.student_name,
        department: body.department,
        current_average: body.current_average,
        trend: body.trend,
        semesters: body.semesters,
        predictions: body.predictions,
        risk: body.risk,
        insight: body.insight,
        features: body.features,
        generated_at: chrono::Utc::now(),
    };

    let document = state.model.report(&payload).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .body(document))
}

async fn get_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, PredictorError> {
    let student_name = path.into_inner();
    let predictions = state.db.history_for_student(&student_name).await?;
    Ok(HttpResponse::Ok().json(HistoryResponse {
        student_name,
        predictions,
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let catalog: Arc<dyn CourseCatalog> = match std::env::var("CATALOG_CSV") {
        Ok(path) => {
            log::info!("Loading course catalog from {path}");
            match StaticCatalog::from_csv(Path::new(&path)) {
                Ok(catalog) => Arc::new(catalog),
                Err(err) => {
                    log::error!("Failed to load catalog from {path}: {err}");
                    return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, err));
                }
            }
        }
        Err(_) => Arc::new(StaticCatalog::builtin()),
    };

    let model_url = std::env::var("MODEL_SERVICE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:predictions.db".to_string());

    let db = Database::connect(&database_url)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::ConnectionRefused, err))?;

    let state = web::Data::new(AppState {
        catalog,
        model: Arc::new(HttpModelService::new(model_url.clone())),
        db,
        baseline: Mutex::new(None),
    });

    log::info!("Using prediction service at {model_url}");
    log::info!("Starting Student Predictor API on http://127.0.0.1:8080");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .route("/api/predict", web::post().to(predict))
            .route("/api/whatif", web::post().to(what_if))
            .route("/api/metrics", web::get().to(get_metrics))
            .route("/api/download-report", web::post().to(download_report))
            .route("/api/history/{student_name}", web::get().to(get_history))
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::io::Write;
    use student_predictor::service::{ModelMetrics, PredictionRequest};

    struct StubModel;

    #[async_trait]
    impl ModelService for StubModel {
        async fn predict(
            &self,
            _request: &PredictionRequest,
        ) -> Result<ModelOutcome, PredictorError> {
            Ok(ModelOutcome::Forecast(ModelForecast {
                current_average: 3.4,
                trend: "Improving".to_string(),
                grade_counts: None,
                predictions: vec![SemesterForecast {
                    semester: 3,
                    predicted_sgpa: 3.5,
                }],
                risk: "LOW RISK".to_string(),
                insight: "Strong performance".to_string(),
                features: vec![],
            }))
        }

        async fn metrics(&self) -> Result<ModelMetrics, PredictorError> {
            Ok(ModelMetrics {
                r2: 0.9,
                rmse: 0.2,
                mae: 0.1,
                test_samples: 100,
            })
        }

        async fn report(&self, _payload: &ReportPayload) -> Result<Vec<u8>, PredictorError> {
            Ok(Vec::new())
        }
    }

    async fn app_state(catalog: Arc<dyn CourseCatalog>) -> web::Data<AppState> {
        web::Data::new(AppState {
            catalog,
            model: Arc::new(StubModel),
            db: Database::connect("sqlite::memory:").await.unwrap(),
            baseline: Mutex::new(None),
        })
    }

    #[actix_web::test]
    async fn blank_grades_fall_back_to_first_term_estimate() {
        let catalog: Arc<dyn CourseCatalog> = Arc::new(StaticCatalog::builtin());
        let n = catalog.courses("Computer Science", 3).len();
        let app = test::init_service(
            App::new()
                .app_data(app_state(catalog).await)
                .route("/api/predict", web::post().to(predict)),
        )
        .await;

        // Semester 3 student who entered no grades at all: the estimator
        // takes over instead of a validation error.
        let payload = serde_json::json!({
            "student_name": "Amina",
            "department": "Computer Science",
            "semester_count": 3,
            "attendance": vec![90.0; n],
            "midterm": vec![40.0; n],
        });
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body.get("sgpa").is_some(), "expected estimate: {body}");
        assert!(body.get("forecast").is_none());
    }

    #[actix_web::test]
    async fn model_path_omits_groups_without_catalog_coverage() {
        // A catalog covering fewer semesters than the student has reached:
        // the current semester has no courses, so the attendance and
        // midterm groups are absent rather than required.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "program,semester,code,title,theory,lab").unwrap();
        writeln!(file, "Applied Math,1,AM101,Calculus I,3,0").unwrap();
        writeln!(file, "Applied Math,1,AM102,Linear Algebra,3,0").unwrap();
        writeln!(file, "Applied Math,2,AM201,Calculus II,3,0").unwrap();
        let catalog: Arc<dyn CourseCatalog> =
            Arc::new(StaticCatalog::from_csv(file.path()).unwrap());

        let app = test::init_service(
            App::new()
                .app_data(app_state(catalog).await)
                .route("/api/predict", web::post().to(predict)),
        )
        .await;

        let payload = serde_json::json!({
            "student_name": "Brian",
            "department": "Applied Math",
            "semester_count": 3,
            "grades": {"1": ["A", "A"], "2": ["B+"]},
        });
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["forecast"]["current_average"], 3.4);
        assert_eq!(body["semesters"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn out_of_range_semester_count_is_rejected() {
        let catalog: Arc<dyn CourseCatalog> = Arc::new(StaticCatalog::builtin());
        let app = test::init_service(
            App::new()
                .app_data(app_state(catalog).await)
                .route("/api/predict", web::post().to(predict)),
        )
        .await;

        for bad in [0u8, 9] {
            let payload = serde_json::json!({
                "student_name": "Amina",
                "department": "Computer Science",
                "semester_count": bad,
            });
            let req = test::TestRequest::post()
                .uri("/api/predict")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
        }
    }
}
