mod common;

use std::{sync::Arc, time::Duration};

use lyceum::{
    domain::{PaymentStatus, UserRole},
    error::AppError,
    payments::UuidTokenGenerator,
    service::ServiceContext,
};

use common::TempDb;

async fn file_context(db: &TempDb) -> anyhow::Result<Arc<ServiceContext>> {
    let pool = db.pool().await?;
    Ok(Arc::new(common::context_with_tokens(pool, Arc::new(UuidTokenGenerator))))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrollments_for_distinct_students() -> anyhow::Result<()> {
    let db = TempDb::new();
    let ctx = file_context(&db).await?;
    let teacher = common::create_user(&ctx, "teacher", UserRole::Teacher).await?;
    let course = common::create_course(&ctx, &teacher, 4900).await?;

    let mut students = Vec::new();
    for i in 0..40 {
        students.push(common::insert_user(&ctx, &format!("student{}", i)).await?);
    }

    let course_id = course.id;
    let handles: Vec<_> = students
        .iter()
        .map(|student| {
            let ctx = ctx.clone();
            let student_id = student.id;
            tokio::spawn(async move { ctx.enrollment_service.enroll(student_id, course_id).await })
        })
        .collect();

    for handle in handles {
        let enrollment = handle.await??;
        assert_eq!(enrollment.course_id, course.id);
    }

    assert_eq!(common::student_count(&ctx, course.id).await?, 40);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrollments_for_one_pair() -> anyhow::Result<()> {
    let db = TempDb::new();
    let ctx = file_context(&db).await?;
    let teacher = common::create_user(&ctx, "teacher", UserRole::Teacher).await?;
    let student = common::insert_user(&ctx, "student").await?;
    let course = common::create_course(&ctx, &teacher, 4900).await?;

    let (student_id, course_id) = (student.id, course.id);
    let handles: Vec<_> = (0..20)
        .map(|_| {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.enrollment_service.enroll(student_id, course_id).await })
        })
        .collect();

    let mut granted = 0;
    let mut already = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => granted += 1,
            Err(AppError::AlreadyEnrolled) => already += 1,
            Err(e) => panic!("unexpected enrollment error: {:?}", e),
        }
    }

    assert_eq!(granted, 1);
    assert_eq!(already, 19);
    assert_eq!(common::student_count(&ctx, course.id).await?, 1);

    let (_, total) = ctx.enrollment_service.list_active(student.id, 1, 10).await?;
    assert_eq!(total, 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_settlements() -> anyhow::Result<()> {
    let db = TempDb::new();
    let ctx = file_context(&db).await?;
    let teacher = common::create_user(&ctx, "teacher", UserRole::Teacher).await?;
    let course = common::create_course(&ctx, &teacher, 9900).await?;

    let mut orders = Vec::new();
    for i in 0..20 {
        let student = common::insert_user(&ctx, &format!("student{}", i)).await?;
        orders.push(ctx.payment_service.create_order(student.id, course.id, "alipay").await?);
    }

    // Every notification arrives twice, concurrently
    let handles: Vec<_> = orders
        .iter()
        .chain(orders.iter())
        .map(|order| {
            let ctx = ctx.clone();
            let order_id = order.order_id.clone();
            tokio::spawn(async move {
                ctx.payment_service.update_status(&order_id, "TXN", "completed").await
            })
        })
        .collect();

    for handle in handles {
        let settled = handle.await??;
        assert_eq!(settled.status, PaymentStatus::Completed);
    }

    assert_eq!(common::student_count(&ctx, course.id).await?, 20);

    Ok(())
}

#[tokio::test]
async fn test_lock_timeout_is_store_unavailable() -> anyhow::Result<()> {
    let db = TempDb::new();
    let ctx = file_context(&db).await?;
    let teacher = common::create_user(&ctx, "teacher", UserRole::Teacher).await?;
    let student = common::insert_user(&ctx, "student").await?;
    let course = common::create_course(&ctx, &teacher, 4900).await?;

    let impatient_pool = db.pool_with(db.options().busy_timeout(Duration::ZERO)).await?;
    let impatient = common::context_with_tokens(impatient_pool, Arc::new(UuidTokenGenerator));

    let mut blocker = ctx.db_pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *blocker).await?;

    let result = impatient.enrollment_service.enroll(student.id, course.id).await;
    match result {
        Err(e @ AppError::StoreUnavailable(_)) => {
            assert_eq!(e.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
        }
        other => panic!("expected StoreUnavailable, got {:?}", other),
    }

    sqlx::query("ROLLBACK").execute(&mut *blocker).await?;
    drop(blocker);

    impatient.enrollment_service.enroll(student.id, course.id).await?;
    assert_eq!(common::student_count(&ctx, course.id).await?, 1);

    Ok(())
}
