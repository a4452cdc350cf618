//! Prompt builders for the text-generation provider.
//!
//! All operator-facing output is Russian, so the instructions are too. The
//! structured-analysis prompt dictates the exact JSON keys that
//! [`crate::PostAnalysis`] deserializes.

/// Upper bound the rewrite prompt asks the model to respect.
pub const REWRITE_CHAR_LIMIT: usize = 2049;

/// Instruction for the structured post analysis (temperature 0.4).
#[must_use]
pub fn analysis(post_text: &str) -> String {
    format!(
        r#"Проанализируй следующий пост из Telegram-канала и ответь строго в JSON формате по полям:
- tema: тема поста (коротко)
- format: формат (текст / видео / карусель / опрос и т.п.)
- length: длина поста в символах
- style: серьёзный / юморной / экспертный / сторителлинг и т.п.
- cta: какой призыв к действию есть, или "нет"; если есть, укажи явно
- zagolovok_5_slov: сгенерируй новый заголовок до 5 слов
- zagolovok_len: длина сгенерированного заголовка
- fact: есть ли научный факт или ссылка на исследование: да/нет
- benefit: есть ли конкретная польза или инструкция: да/нет
- comment_call: есть ли призыв прокомментировать: да/нет
- insight: краткий вывод, в чём сила поста
- filter: определи, является ли пост Личным или Профессиональным.
  `Личное` — посты о личных мероприятиях и событиях, не связанных с деятельностью компании.
  `Профессиональное` — посты по профилю компании: продукты, советы, отраслевые новости.
Текст поста:
"""{post_text}"""
"#
    )
}

/// Instruction for the brand-context rewrite (temperature 0.8).
#[must_use]
pub fn rewrite(context: &str, post_text: &str) -> String {
    format!(
        r#"Контекст: {context}
Ниже популярный пост из Telegram:
"{post_text}"
На основе этого поста и контекста создай уникальный Telegram-пост для нашей компании.
Сохрани идею и пользу, но полностью перепиши текст под наш стиль.
Не упоминай чужие бренды. Пиши ясно, экспертно и по делу. Объём — до {REWRITE_CHAR_LIMIT} символов с пробелами.
"#
    )
}

/// Instruction for plain translation into Russian (temperature 0.8).
#[must_use]
pub fn translate(text: &str) -> String {
    format!(
        r#"Переведи текст на русский язык и пришли ТОЛЬКО переведённый текст.
"{text}"
"#
    )
}

/// System role for the video-brief generation step.
pub const VIDEO_BRIEF_ROLE: &str =
    "Ты креативный директор, который адаптирует видео-контент под бренд компании.";

/// Instruction producing a video-production brief from a competitor's
/// transcription (temperature 0.7).
#[must_use]
pub fn video_brief(context: &str, transcription: &str) -> String {
    format!(
        r#"Контекст компании: {context}

Ниже описание и скрипт видео конкурента:
"{transcription}"

На основе этого описания создай подробное предложение для съёмки похожего видео для нашей компании.
Включи:
1. Адаптацию сценария под наш бренд и продукты
2. Конкретные технические требования к съёмке
3. Рекомендации по локации и реквизиту
4. Предложения по тексту/речи
5. Идеи для визуальных эффектов или графики

Сохрани структуру и эмоциональное воздействие оригинала, но адаптируй под наш стиль и аудиторию.
"#
    )
}
