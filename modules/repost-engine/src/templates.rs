use crate::pipeline::{push_unique, COMMENT_SET_SIZE};

/// Floor for a template-generated set. Below this the backfill pool is
/// appended.
const MIN_TEMPLATE_COMMENTS: usize = 5;

/// A single comment template. `WithSubject` templates carry a `{word}`
/// placeholder filled with the first usable title word at render time.
#[derive(Debug)]
pub enum Template {
    Fixed(&'static str),
    WithSubject {
        format: &'static str,
        fallback: &'static str,
    },
}

impl Template {
    pub fn render(&self, subject: Option<&str>) -> String {
        match self {
            Template::Fixed(text) => (*text).to_string(),
            Template::WithSubject { format, fallback } => {
                format.replace("{word}", subject.unwrap_or(fallback))
            }
        }
    }
}

/// Keywords and the comments they unlock. A group matches when any of
/// its keywords occurs in the lowercased title or body.
#[derive(Debug)]
pub struct KeywordGroup {
    pub keywords: &'static [&'static str],
    pub templates: &'static [Template],
}

/// The keyword template bank. Groups are checked in definition order and
/// every matching group contributes all of its templates.
pub static KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        keywords: &["맛집", "음식점", "카페", "레스토랑", "식당"],
        templates: &[
            Template::WithSubject {
                format: "{word} 정말 가보고 싶네요! 상세한 후기 감사합니다 😊",
                fallback: "여기",
            },
            Template::WithSubject {
                format: "와 {word} 분위기 좋아보이네요! 다음에 꼭 방문해볼게요!",
                fallback: "이곳",
            },
            Template::Fixed("메뉴 구성이 정말 괜찮아 보이네요! 리뷰 보고 가고 싶어졌어요 👍"),
            Template::Fixed("사진만 봐도 맛있어 보이네요! 상세한 리뷰 너무 감사합니다!"),
        ],
    },
    KeywordGroup {
        keywords: &["맛있", "맛나", "맛집", "먹", "음식"],
        templates: &[
            Template::Fixed("포스팅 보니까 정말 맛있어 보이네요! 꼭 가봐야겠어요!"),
            Template::Fixed("이렇게 자세한 리뷰 남겨주셔서 감사해요! 메뉴 선택에 도움이 많이 됐어요!"),
            Template::Fixed("사진 보니까 침이 고이네요 ㅎㅎ 좋은 정보 감사합니다!"),
        ],
    },
    KeywordGroup {
        keywords: &["여행", "관광", "여행지", "투어"],
        templates: &[
            Template::WithSubject {
                format: "{word} 여행 계획 중인데 정말 유용한 정보네요!",
                fallback: "여기",
            },
            Template::Fixed("여행 코스 참고하겠습니다! 자세한 후기 너무 좋아요 ✈️"),
            Template::Fixed("사진 보니까 정말 가고 싶네요! 일정 짤 때 참고할게요!"),
            Template::Fixed("이런 숨은 명소가 있었다니! 포스팅 감사합니다!"),
        ],
    },
    KeywordGroup {
        keywords: &["힐링", "휴양", "휴가", "쉼", "풍경"],
        templates: &[
            Template::Fixed("힐링 제대로 되겠어요! 저도 꼭 가보고 싶네요 🌿"),
            Template::Fixed("풍경이 정말 아름답네요! 좋은 곳 공유해주셔서 감사해요!"),
        ],
    },
    KeywordGroup {
        keywords: &["후기", "리뷰", "사용기", "체험"],
        templates: &[
            Template::Fixed("솔직한 후기 너무 감사합니다! 구매 결정하는데 큰 도움이 됐어요!"),
            Template::Fixed("이런 상세한 리뷰 찾고 있었는데 딱이네요! 감사합니다 👏"),
            Template::Fixed("장단점을 잘 정리해주셔서 이해하기 쉬웠어요! 좋은 정보 감사합니다!"),
            Template::Fixed("실사용 후기라서 더 신뢰가 가네요! 포스팅 감사드려요!"),
        ],
    },
    KeywordGroup {
        keywords: &["추천", "강추", "인정", "좋"],
        templates: &[
            Template::Fixed("추천해주신 내용 꼼꼼히 읽어봤어요! 정말 도움이 많이 됐습니다!"),
            Template::Fixed("이렇게 자세히 알려주시니 고민이 해결됐어요! 감사합니다!"),
        ],
    },
    KeywordGroup {
        keywords: &["정보", "팁", "tip", "방법", "노하우"],
        templates: &[
            Template::Fixed("유익한 정보 공유해주셔서 감사합니다! 바로 적용해볼게요!"),
            Template::Fixed("이런 꿀팁이! 포스팅 보고 많이 배웠어요 👍"),
            Template::Fixed("정말 필요한 정보였는데 감사합니다! 저장해뒀어요!"),
            Template::Fixed("자세한 설명 덕분에 이해가 쏙쏙 되네요! 감사해요!"),
        ],
    },
    KeywordGroup {
        keywords: &["레시피", "요리", "만들", "조리"],
        templates: &[
            Template::Fixed("레시피 너무 자세해서 좋아요! 저도 만들어봐야겠어요 🍳"),
            Template::Fixed("이렇게 간단하게 만들 수 있다니! 주말에 도전해볼게요!"),
            Template::Fixed("사진이랑 설명이 너무 잘 되어있어서 따라하기 쉬울 것 같아요!"),
        ],
    },
    KeywordGroup {
        keywords: &["일상", "하루", "오늘", "요즘"],
        templates: &[
            Template::Fixed("공감가는 내용이 많네요! 잘 읽고 갑니다 😊"),
            Template::Fixed("저도 비슷한 경험이 있어서 더 공감이 가네요!"),
        ],
    },
    KeywordGroup {
        keywords: &["화장", "메이크업", "뷰티", "코스메틱", "스킨케어"],
        templates: &[
            Template::Fixed("제품 정보 너무 상세하게 알려주셔서 감사해요! 구매 리스트에 추가했어요!"),
            Template::Fixed("사용 후기가 궁금했는데 딱 원하던 정보네요! 감사합니다 💄"),
        ],
    },
    KeywordGroup {
        keywords: &["패션", "옷", "코디", "스타일"],
        templates: &[Template::Fixed("스타일링 센스가 너무 좋으세요! 참고할게요 👗")],
    },
    KeywordGroup {
        keywords: &["육아", "아이", "아기", "엄마", "교육"],
        templates: &[
            Template::Fixed("육아 정보 너무 유익해요! 저도 적용해봐야겠어요!"),
            Template::Fixed("같은 고민 하고 있었는데 도움이 많이 됐어요! 감사합니다!"),
        ],
    },
    KeywordGroup {
        keywords: &["운동", "헬스", "다이어트", "건강", "피트니스"],
        templates: &[
            Template::Fixed("운동 루틴 참고하겠습니다! 동기부여 받고 가요 💪"),
            Template::Fixed("자세한 운동 방법 알려주셔서 감사해요! 따라해볼게요!"),
        ],
    },
];

/// Comments for posts no keyword group recognizes.
pub const GENERIC_COMMENTS: &[&str] = &[
    "포스팅 정말 알차게 잘 쓰셨네요! 많은 도움이 됐어요!",
    "이렇게 자세한 글은 처음 봐요! 감사합니다 👍",
    "꼼꼼하게 작성해주셔서 읽기 편했어요! 좋은 정보 감사해요!",
    "궁금했던 내용이었는데 덕분에 궁금증이 해소됐어요!",
    "유익한 정보 공유해주셔서 감사합니다! 도움이 많이 됐어요!",
    "글 읽으면서 많이 배웠어요! 앞으로도 좋은 글 부탁드려요 😊",
    "상세한 설명 덕분에 이해가 쏙쏙 되네요! 감사합니다!",
    "정성스러운 포스팅 감사드립니다! 저장해뒀어요!",
];

/// Appended when a matched set comes out under the floor.
pub const BACKFILL_COMMENTS: &[&str] = &[
    "블로그 자주 방문할게요! 좋은 글 감사합니다!",
    "유익한 정보 공유해주셔서 감사해요! 다음 글도 기대할게요!",
    "정말 유용한 내용이네요! 주변에도 공유하겠습니다!",
    "이런 양질의 콘텐츠 감사합니다! 구독하고 갑니다!",
];

/// The first whitespace-separated title word longer than one character,
/// used as the subject of personalized templates.
pub fn subject_word(title: &str) -> Option<&str> {
    title.split_whitespace().find(|w| w.chars().count() > 1)
}

/// Every group with a keyword occurring in `text`, in bank order.
/// `text` must already be lowercased.
pub fn matched_groups(text: &str) -> Vec<&'static KeywordGroup> {
    KEYWORD_GROUPS
        .iter()
        .filter(|group| group.keywords.iter().any(|k| text.contains(k)))
        .collect()
}

/// Comment generation from the keyword bank alone. Output is 5 to 8
/// distinct comments regardless of what the post looks like.
pub struct TemplateCommentGenerator;

impl TemplateCommentGenerator {
    pub fn generate(&self, title: &str, content: &str) -> Vec<String> {
        let text = format!("{title} {content}").to_lowercase();
        let subject = subject_word(title);
        let groups = matched_groups(&text);

        let mut candidates: Vec<String> = Vec::new();
        for group in &groups {
            for template in group.templates {
                candidates.push(template.render(subject));
            }
        }

        // Two personalized comments when the title gave us a subject and
        // at least one topic matched. The first quotes the title itself.
        if subject.is_some() && !groups.is_empty() {
            candidates.push(format!(
                "\"{title}\" 글 너무 잘 읽었어요! 유익한 정보 감사합니다!"
            ));
            candidates
                .push("포스팅 제목보고 들어왔는데 기대 이상이네요! 알찬 정보 감사해요!".to_string());
        }

        if candidates.is_empty() {
            candidates = GENERIC_COMMENTS.iter().map(|c| (*c).to_string()).collect();
        }

        let mut comments = Vec::new();
        for candidate in candidates {
            push_unique(&mut comments, candidate, COMMENT_SET_SIZE);
        }

        if comments.len() < MIN_TEMPLATE_COMMENTS {
            for extra in BACKFILL_COMMENTS {
                push_unique(&mut comments, (*extra).to_string(), COMMENT_SET_SIZE);
            }
        }

        comments
    }
}
