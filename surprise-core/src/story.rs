//! The closing story and the scene prompts that quote earlier choices.

use serde::{Deserialize, Serialize};

use crate::choices::{Catalog, Dilemma, FinalChoices, Outcome, Plan};

/// Who the surprise is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Honoree {
    pub name: String,
    /// The name as the crowd shouts it.
    pub cheer_name: String,
    pub age: u32,
    /// Birthday date as written in the story.
    pub date: String,
}

impl Default for Honoree {
    fn default() -> Self {
        Self {
            name: "Zeynep".to_string(),
            cheer_name: "Zeyneep".to_string(),
            age: 22,
            date: "28 Ekim 2025".to_string(),
        }
    }
}

/// Prompt shown on the dilemma scene.
pub fn dilemma_question(person: &str) -> String {
    format!(
        "{person} beraber adadan kaçmanız gerektiğini söylüyor, ama kaçarsanız seçeceğiniz 2 kişi hariç tüm dünyadaki insanların öleceğini biliyorsunuz, kaçacak mısınız?"
    )
}

/// Prompt shown on the activity scene, depending on how the dilemma went.
pub fn activity_question(dilemma: Dilemma) -> &'static str {
    match dilemma {
        Dilemma::Stayed => "Adada memnunsunuz demek, peki adada ne yapmayı planlıyorsunuz?",
        Dilemma::Escaped => "Şehire ulaştınız, şimdi ne yapmayı planlıyorsunuz?",
    }
}

/// The paragraph told for each plan, leading up to the portal.
pub fn plan_paragraph(plan: Plan, honoree: &Honoree) -> String {
    match plan {
        Plan::HangOut => "Bu 'hiçlik' halinin verdiği huzurla kumsalda amaçsızca yürüyorlardı. Ayaklarının altındaki kumun ve dalgaların sesinin tadını çıkarırken, ileride parlayan garip bir anomali gözlerine çarptı.".to_string(),
        Plan::FindActivity => "Macera ruhları kabarmıştı, adanın gizemli iç kısımlarına doğru keşfe çıktılar. Patikaları takip edip eski kalıntıları incelerken, iki kadim ağacın arasında titreşen bir enerji alanı fark ettiler.".to_string(),
        Plan::DoWeHaveTo => "Bu anlamsız koşuşturmacanın gereksiz olduğunu düşünüp, en yakın gölgeliğe uzandılar. Hayatın anlamını sorgularken, tam da yattıkları yerin üzerindeki kayalıklarda bir girdabın yavaşça oluştuğunu gördüler.".to_string(),
        Plan::Sunbathe => format!(
            "{}, 'Bronzlaşmadan bu adadan dönmem!' diyerek en güzel güneşli köşeyi kaptı. Gözleri kapalı bir şekilde D vitamininin keyfini sürerken, ansızın gelen bir serinlik ve uğultuyla gözlerini açtığında hemen yanı başında bir portalın belirdiğini gördü.",
            honoree.name
        ),
        Plan::PostStory => "Hemen telefonunu çıkarıp 'Ada Hayatı #NoFilter' notuyla en estetik açıyı bulmaya çalıştı. Tam mükemmel pozu yakalamak için kamerasını çevirdiğinde, ekranda beliren AR filtresi sandığı şeyin aslında gerçek bir portal olduğunu fark etti.".to_string(),
    }
}

/// Render the closing story from a completed record.
pub fn render_story(choices: &FinalChoices, catalog: &Catalog, honoree: &Honoree) -> String {
    let name = &honoree.name;
    let person = catalog.person_name(choices.person);
    let items = choices
        .items
        .iter()
        .map(|item| catalog.item_name(*item))
        .collect::<Vec<_>>()
        .join(", ");

    let mut story = format!(
        "Bir gün {name} adlı bir kız {age} yaşına gireyim derken bir hata ile karşılaşıyor ve simülasyonun içine düşüp adada mahsur kalıyor, yanına {items} alıyor ve onunla birlikte {person}'nin gelmesini istiyor. {person} biraz tereddütte kalsa da onu kıramayıp \"Hadi gel gidelim ne olacaksa olsun\" diyor. Daha sonra adadan kaçma fırsatı ellerine geçince {name} ikilemde kalıyor ama asla {person} ile danışmıyor, kendi kendine adadan {dilemma} seçeneğine razı olduğunu söylüyor. ",
        age = honoree.age,
        dilemma = choices.outcome.dilemma().label(),
    );

    if let Outcome::Escaped(escapees) = &choices.outcome {
        let escapees = escapees
            .iter()
            .map(|p| catalog.person_name(*p))
            .collect::<Vec<_>>()
            .join(" ve ");
        story.push_str(&format!(
            "Adadan kaçmak tabi insanları tehlikeye atacak olsa da {name} \"yanımda {person}, {escapees} olduğu sürece sıkıntı yok\" dedi. "
        ));
    }

    story.push_str(&format!(
        "Bir süre oralarda takılınca {name} '{plan}' yapmaya karar verdi. ",
        plan = choices.plan.label()
    ));
    story.push_str(&plan_paragraph(choices.plan, honoree));

    story.push_str(&format!(
        " Daha sonra bir portala denk geldiler ve {name} içeri daldı. Saatine baktı 23:59'du. {date} tarihinde olduğunu tam fark ederken 00:00 oldu. Her yer konfeti ve havai fişeklerle dolmaya başladı. Herkes tek bir ağızdan ona \"Doğum Günün Kutlu Olsun {cheer}\" diyordu. Bu kadar fazla kişi nasıl toplanmıştı bilmiyordu. Önüne bir zarf geldi ve zarfı açmaya başladı.",
        date = honoree.date,
        cheer = honoree.cheer_name,
    ));

    story
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(["A", "B", "C", "D"], ["X", "Y", "Z"]).unwrap()
    }

    fn choices(catalog: &Catalog, outcome: Outcome, plan: Plan) -> FinalChoices {
        FinalChoices {
            items: [
                catalog.find_item("A").unwrap(),
                catalog.find_item("B").unwrap(),
                catalog.find_item("C").unwrap(),
            ],
            person: catalog.find_person("X").unwrap(),
            outcome,
            plan,
        }
    }

    #[test]
    fn test_stayed_story() {
        let catalog = catalog();
        let honoree = Honoree::default();
        let story = render_story(
            &choices(&catalog, Outcome::Stayed, Plan::HangOut),
            &catalog,
            &honoree,
        );

        assert!(story.contains("yanına A, B, C alıyor"));
        assert!(story.contains("X'nin gelmesini istiyor"));
        assert!(story.contains("adadan kaçmadı seçeneğine"));
        assert!(story.contains(&plan_paragraph(Plan::HangOut, &honoree)));
        assert!(story.contains("'Hiiç takılırız' yapmaya karar verdi"));
        assert!(!story.contains("yanımda"));
        assert!(story.ends_with("zarfı açmaya başladı."));
    }

    #[test]
    fn test_escaped_story_lists_escapees() {
        let catalog = catalog();
        let pair = [
            catalog.find_person("Y").unwrap(),
            catalog.find_person("Z").unwrap(),
        ];
        let story = render_story(
            &choices(&catalog, Outcome::Escaped(pair), Plan::FindActivity),
            &catalog,
            &Honoree::default(),
        );

        assert!(story.contains("adadan kaçtı seçeneğine"));
        assert!(story.contains("\"yanımda X, Y ve Z olduğu sürece sıkıntı yok\""));
    }

    #[test]
    fn test_every_plan_has_a_paragraph() {
        let catalog = catalog();
        let honoree = Honoree::default();
        for plan in Plan::all() {
            let paragraph = plan_paragraph(*plan, &honoree);
            assert!(!paragraph.is_empty());
            let story = render_story(&choices(&catalog, Outcome::Stayed, *plan), &catalog, &honoree);
            assert!(story.contains(&paragraph), "missing paragraph for {plan}");
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let catalog = catalog();
        let honoree = Honoree::default();
        let record = choices(&catalog, Outcome::Stayed, Plan::PostStory);
        assert_eq!(
            render_story(&record, &catalog, &honoree),
            render_story(&record, &catalog, &honoree)
        );
    }

    #[test]
    fn test_honoree_fields_are_used() {
        let catalog = catalog();
        let honoree = Honoree {
            name: "Ada".to_string(),
            cheer_name: "Adaa".to_string(),
            age: 30,
            date: "1 Mayıs 2030".to_string(),
        };
        let story = render_story(
            &choices(&catalog, Outcome::Stayed, Plan::Sunbathe),
            &catalog,
            &honoree,
        );
        assert!(story.starts_with("Bir gün Ada adlı bir kız 30 yaşına"));
        assert!(story.contains("Ada, 'Bronzlaşmadan"));
        assert!(story.contains("1 Mayıs 2030 tarihinde"));
        assert!(story.contains("Doğum Günün Kutlu Olsun Adaa"));
        assert!(!story.contains("Zeynep"));
    }

    #[test]
    fn test_prompts() {
        assert!(dilemma_question("X").starts_with("X beraber adadan"));
        assert_ne!(
            activity_question(Dilemma::Stayed),
            activity_question(Dilemma::Escaped)
        );
    }
}
