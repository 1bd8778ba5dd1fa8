//! Repository for the `sections` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::section::{CreateSection, Section, SectionWithLessons, UpdateSection};
use crate::repositories::LessonRepo;

const COLUMNS: &str = "id, course_id, title, description, order_index, created_at, updated_at";

pub struct SectionRepo;

impl SectionRepo {
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateSection,
    ) -> Result<Section, sqlx::Error> {
        let query = format!(
            "INSERT INTO sections (course_id, title, description, order_index)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.order_index)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections WHERE id = $1");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sections WHERE course_id = $1 ORDER BY order_index, id"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Sections of a course, each with its ordered lessons.
    pub async fn outline(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<SectionWithLessons>, sqlx::Error> {
        let sections = Self::list_by_course(pool, course_id).await?;
        let mut lessons = LessonRepo::list_by_course(pool, course_id).await?;

        let outline = sections
            .into_iter()
            .map(|section| {
                let (own, rest): (Vec<_>, Vec<_>) =
                    lessons.drain(..).partition(|l| l.section_id == section.id);
                lessons = rest;
                SectionWithLessons {
                    section,
                    lessons: own,
                }
            })
            .collect();
        Ok(outline)
    }

    /// Update a section, scoped to its course. Returns `None` when the section
    /// does not exist in that course.
    pub async fn update(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "UPDATE sections SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                order_index = COALESCE($5, order_index)
             WHERE id = $1 AND course_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .bind(course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.order_index)
            .fetch_optional(pool)
            .await
    }

    /// Delete a section and its lessons. Returns `true` if the row existed.
    pub async fn delete(pool: &PgPool, course_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
