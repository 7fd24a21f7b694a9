//! Category knowledge base
//!
//! Static, read-only dictionaries consumed by the type classifier, the
//! category inference engine and the rule-based extractor. All terms are
//! stored folded (see [`crate::text::fold`]) and match as whole words or
//! whole phrases.
//!
//! Two layers of vocabulary exist on purpose:
//! - `KEYWORDS`: curated per-category lists (merchant types, bill types)
//! - `SYNONYMS`: a flat long-tail map (brands, banks, slang)
//!
//! Ambiguous terms ("celular" the bill vs. "celular" the phone) are resolved
//! by giving the more specific phrase its own entry; the longest match wins.

use std::sync::LazyLock;

use crate::models::Category;

/// Curated keyword lists, one per category
pub static KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Alimentacao,
        &[
            "mercado",
            "supermercado",
            "mercearia",
            "mercadinho",
            "feira",
            "sacolao",
            "hortifruti",
            "padaria",
            "acougue",
            "restaurante",
            "lanchonete",
            "lanche",
            "almoco",
            "jantar",
            "cafe",
            "cafe da manha",
            "comida",
            "refeicao",
            "marmita",
            "pizza",
            "hamburguer",
            "sorvete",
            "acai",
            "delivery",
            "churrasco",
        ],
    ),
    (
        Category::Moradia,
        &[
            "aluguel",
            "condominio",
            "iptu",
            "conta de luz",
            "conta de agua",
            "conta de energia",
            "energia eletrica",
            "gas de cozinha",
            "botijao",
            "reforma",
            "manutencao da casa",
            "diarista",
            "faxina",
            "prestacao da casa",
            "financiamento da casa",
            "financiamento do apartamento",
        ],
    ),
    (
        Category::Transporte,
        &[
            "taxi",
            "onibus",
            "metro",
            "trem",
            "passagem",
            "bilhete unico",
            "gasolina",
            "combustivel",
            "etanol",
            "alcool no posto",
            "diesel",
            "posto",
            "estacionamento",
            "pedagio",
            "ipva",
            "oficina",
            "mecanico",
            "troca de oleo",
            "seguro do carro",
        ],
    ),
    (
        Category::Internet,
        &[
            "internet",
            "wifi",
            "banda larga",
            "fibra",
            "plano de celular",
            "conta do celular",
            "conta de celular",
            "conta de telefone",
            "telefone",
            "recarga",
            "recarga de celular",
            "tv a cabo",
        ],
    ),
    (
        Category::Cartao,
        &[
            "fatura",
            "fatura do cartao",
            "fatura do cartao de credito",
            "cartao de credito",
            "anuidade",
            "anuidade do cartao",
            "rotativo",
        ],
    ),
    (
        Category::Saude,
        &[
            "farmacia",
            "drogaria",
            "remedio",
            "remedios",
            "medicamento",
            "medico",
            "consulta",
            "dentista",
            "exame",
            "exames",
            "hospital",
            "plano de saude",
            "psicologo",
            "terapia",
            "academia",
            "otica",
            "vacina",
        ],
    ),
    (
        Category::Lazer,
        &[
            "cinema",
            "show",
            "teatro",
            "bar",
            "balada",
            "viagem",
            "hotel",
            "passeio",
            "festa",
            "ingresso",
            "jogo",
            "parque",
            "streaming",
            "clube",
            "praia",
        ],
    ),
    (
        Category::Compras,
        &[
            "loja",
            "shopping",
            "roupa",
            "roupas",
            "sapato",
            "tenis",
            "celular",
            "celular novo",
            "eletronico",
            "eletronicos",
            "presente",
            "perfume",
            "livro",
            "maquiagem",
            "moveis",
            "eletrodomestico",
            "notebook",
            "computador",
            "mercado livre",
        ],
    ),
    (
        Category::Investimentos,
        &[
            "investimento",
            "investimentos",
            "investi",
            "aplicacao",
            "apliquei",
            "poupanca",
            "tesouro direto",
            "tesouro",
            "cdb",
            "lci",
            "lca",
            "acoes",
            "bolsa de valores",
            "fundo imobiliario",
            "dividendos",
            "rendimento",
            "rendimentos",
            "cripto",
            "bitcoin",
            "previdencia",
        ],
    ),
    (
        Category::Familia,
        &[
            "filho",
            "filha",
            "filhos",
            "escola",
            "mensalidade escolar",
            "creche",
            "fralda",
            "fraldas",
            "mesada",
            "pensao",
            "brinquedo",
            "pet shop",
            "veterinario",
            "racao",
        ],
    ),
    (
        Category::Doacoes,
        &[
            "doacao", "doacoes", "doei", "dizimo", "oferta", "caridade", "igreja", "vaquinha",
            "ong",
        ],
    ),
    (
        Category::Outros,
        &["taxa", "tarifa", "tarifa bancaria", "multa", "imposto", "saque"],
    ),
];

/// Long-tail vocabulary: brands, banks, apps and informal terms
pub static SYNONYMS: &[(&str, Category)] = &[
    // Food
    ("ifood", Category::Alimentacao),
    ("rappi", Category::Alimentacao),
    ("ze delivery", Category::Alimentacao),
    ("mcdonalds", Category::Alimentacao),
    ("mc donalds", Category::Alimentacao),
    ("burger king", Category::Alimentacao),
    ("subway", Category::Alimentacao),
    ("starbucks", Category::Alimentacao),
    ("carrefour", Category::Alimentacao),
    ("pao de acucar", Category::Alimentacao),
    ("assai", Category::Alimentacao),
    ("atacadao", Category::Alimentacao),
    ("rango", Category::Alimentacao),
    ("larica", Category::Alimentacao),
    // Transport
    ("uber", Category::Transporte),
    ("99pop", Category::Transporte),
    ("99 pop", Category::Transporte),
    ("cabify", Category::Transporte),
    ("ipiranga", Category::Transporte),
    ("shell", Category::Transporte),
    ("sem parar", Category::Transporte),
    ("busao", Category::Transporte),
    ("gasosa", Category::Transporte),
    // Bills
    ("vivo", Category::Internet),
    ("claro", Category::Internet),
    ("tim", Category::Internet),
    ("net", Category::Internet),
    ("sky", Category::Internet),
    ("nubank", Category::Cartao),
    ("itau", Category::Cartao),
    ("bradesco", Category::Cartao),
    ("santander", Category::Cartao),
    ("banco do brasil", Category::Cartao),
    ("caixa economica", Category::Cartao),
    ("c6", Category::Cartao),
    ("picpay", Category::Cartao),
    ("sabesp", Category::Moradia),
    ("enel", Category::Moradia),
    ("cemig", Category::Moradia),
    ("copel", Category::Moradia),
    ("light", Category::Moradia),
    ("comgas", Category::Moradia),
    // Health
    ("drogasil", Category::Saude),
    ("raia", Category::Saude),
    ("pague menos", Category::Saude),
    ("smart fit", Category::Saude),
    ("unimed", Category::Saude),
    ("amil", Category::Saude),
    // Leisure
    ("netflix", Category::Lazer),
    ("spotify", Category::Lazer),
    ("disney", Category::Lazer),
    ("hbo", Category::Lazer),
    ("prime video", Category::Lazer),
    ("youtube premium", Category::Lazer),
    ("steam", Category::Lazer),
    ("playstation", Category::Lazer),
    ("airbnb", Category::Lazer),
    ("breja", Category::Lazer),
    ("boteco", Category::Lazer),
    ("role", Category::Lazer),
    // Purchases
    ("amazon", Category::Compras),
    ("shopee", Category::Compras),
    ("shein", Category::Compras),
    ("aliexpress", Category::Compras),
    ("magalu", Category::Compras),
    ("casas bahia", Category::Compras),
    ("americanas", Category::Compras),
    ("renner", Category::Compras),
    ("riachuelo", Category::Compras),
    ("zara", Category::Compras),
    // Investments
    ("xp", Category::Investimentos),
    ("btg", Category::Investimentos),
    ("rico", Category::Investimentos),
    ("nuinvest", Category::Investimentos),
    ("binance", Category::Investimentos),
    ("cofrinho", Category::Investimentos),
    // Family
    ("petz", Category::Familia),
    ("cobasi", Category::Familia),
    // Donations
    ("unicef", Category::Doacoes),
    ("cruz vermelha", Category::Doacoes),
];

/// Terms that make a sentence an expense, regardless of any model opinion
///
/// Direct verbs first, then gerunds/participles, then domain nouns.
pub static EXPENSE_TRIGGERS: &[&str] = &[
    "gastei",
    "paguei",
    "comprei",
    "transferi",
    "enviei",
    "mandei",
    "saquei",
    "assinei",
    "doei",
    "torrei",
    "gastando",
    "pagando",
    "comprando",
    "gasto",
    "gastos",
    "pago",
    "fatura",
    "boleto",
    "conta de",
    "despesa",
    "debitado",
    "debito",
    "parcela",
    "mensalidade",
];

/// Terms that make a sentence income when no expense trigger is present
pub static INCOME_TRIGGERS: &[&str] = &[
    "recebi",
    "ganhei",
    "vendi",
    "recebendo",
    "ganhando",
    "recebido",
    "recebida",
    "pix recebido",
    "salario",
    "rendimento",
    "rendimentos",
    "reembolso",
    "freela",
    "freelance",
    "comissao",
    "bonus",
    "lucro",
    "decimo terceiro",
];

/// Income cues used by the rule-based extractor (single list, no expense pass)
pub static RULE_INCOME_CUES: &[&str] = &[
    "recebi",
    "ganhei",
    "vendi",
    "recebido",
    "pix recebido",
    "salario",
    "reembolso",
    "rendimento",
    "freela",
];

/// Cues that the user is setting money aside
pub static SAVING_CUES: &[&str] = &[
    "guardar",
    "guardei",
    "economizar",
    "economizei",
    "poupar",
    "poupei",
    "reservar",
    "reservei",
    "separar",
    "separei",
    "juntar",
    "juntei",
    "cofrinho",
    "reserva de emergencia",
];

/// Goal label used when a saving intent has no explicit destination
pub const DEFAULT_SAVING_GOAL: &str = "Reserva";

/// A dictionary term paired with the category it points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub text: &'static str,
    pub category: Category,
}

/// Keyword terms flattened and sorted longest first (ties keep closed-set order)
pub static KEYWORD_INDEX: LazyLock<Vec<Term>> = LazyLock::new(|| {
    let terms = KEYWORDS
        .iter()
        .flat_map(|(category, words)| {
            words.iter().map(move |text| Term {
                text,
                category: *category,
            })
        })
        .collect();
    longest_first(terms)
});

/// Synonym terms sorted longest first (ties keep closed-set order)
pub static SYNONYM_INDEX: LazyLock<Vec<Term>> = LazyLock::new(|| {
    let terms = SYNONYMS
        .iter()
        .map(|(text, category)| Term {
            text,
            category: *category,
        })
        .collect();
    longest_first(terms)
});

fn longest_first(mut terms: Vec<Term>) -> Vec<Term> {
    terms.sort_by(|a, b| {
        b.text
            .len()
            .cmp(&a.text.len())
            .then_with(|| category_rank(a.category).cmp(&category_rank(b.category)))
    });
    terms
}

fn category_rank(category: Category) -> usize {
    Category::all()
        .iter()
        .position(|c| *c == category)
        .unwrap_or(usize::MAX)
}

/// Keywords curated for one category
pub fn keywords_for(category: Category) -> &'static [&'static str] {
    KEYWORDS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}
